//! Run reports: console summary and JSON artefact

use crate::error::{CliError, CliResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outcome of one scenario or contract check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Scenario or check name
    pub name: String,
    /// Whether it passed
    pub passed: bool,
    /// Summary or failure message
    pub detail: String,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Events emitted while it ran
    #[serde(default)]
    pub events: usize,
    /// Failure screenshot, if one was captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl CheckOutcome {
    /// Passing outcome
    #[must_use]
    pub fn passed(name: &str, detail: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: detail.into(),
            duration_ms,
            events: 0,
            screenshot: None,
        }
    }

    /// Failing outcome
    #[must_use]
    pub fn failed(name: &str, detail: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            passed: false,
            ..Self::passed(name, detail, duration_ms)
        }
    }
}

/// Report for one command run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// `form` or `api`
    pub suite: String,
    /// Target the run was pointed at
    pub target: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Trace id of the collected event log, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Outcomes in run order
    pub outcomes: Vec<CheckOutcome>,
}

impl RunReport {
    /// Start an empty report
    #[must_use]
    pub fn new(suite: &str, target: impl Into<String>) -> Self {
        Self {
            suite: suite.to_string(),
            target: target.into(),
            started_at: Utc::now(),
            trace_id: None,
            outcomes: Vec::new(),
        }
    }

    /// Append an outcome
    pub fn push(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    /// Passed count
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// Failed count
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// Write `<suite>-<timestamp>.json` into `dir`, creating it if needed
    pub fn write(&self, dir: &Path) -> CliResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "{}-{}.json",
            self.suite,
            self.started_at.format("%Y%m%dT%H%M%S%3fZ")
        ));
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    /// Print a summary to stderr
    pub fn print_summary(&self) {
        eprintln!("\n{} suite against {}", self.suite, self.target);
        for outcome in &self.outcomes {
            let mark = if outcome.passed { "✓" } else { "✗" };
            eprintln!(
                "  {mark} {:<14} {:>6}ms  {}",
                outcome.name, outcome.duration_ms, outcome.detail
            );
        }
        eprintln!(
            "\n  {} passed, {} failed",
            self.passed(),
            self.failed()
        );
    }

    /// `Ok` when everything passed
    pub fn into_result(self) -> CliResult<()> {
        match self.failed() {
            0 => Ok(()),
            failed => Err(CliError::ChecksFailed {
                failed,
                total: self.outcomes.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunReport {
        let mut report = RunReport::new("form", "https://demoqa.com");
        report.push(CheckOutcome::passed("minimal", "submitted", 120));
        report.push(CheckOutcome::failed("guard", "modal stuck", 900));
        report
    }

    #[test]
    fn test_counts() {
        let report = sample();
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_into_result_reports_failures() {
        match sample().into_result() {
            Err(CliError::ChecksFailed { failed, total }) => {
                assert_eq!((failed, total), (1, 2));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(RunReport::new("api", "x").into_result().is_ok());
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports");
        let path = sample().write(&nested).unwrap();

        assert!(path.starts_with(&nested));
        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: RunReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.outcomes.len(), 2);
        assert!(!text.contains("screenshot"));
    }
}
