//! Suite runners behind the subcommands

use crate::commands::{FixtureKind, ScenarioName};
use crate::error::CliResult;
use crate::report::{CheckOutcome, RunReport};
use crate::scenarios::run_scenario;
use formprobe::fixtures::{generate_new_user, generate_valid_record};
use formprobe::{EventLog, FormDriver, PracticeFormPage, SuiteConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Run form scenarios in order on one driver.
///
/// A failing scenario gets a screenshot in `output` when the driver can
/// produce one; the collected events are written next to the report.
pub async fn run_form_suite<D: FormDriver>(
    driver: D,
    config: &SuiteConfig,
    scenarios: &[ScenarioName],
    seed: u64,
    output: &Path,
) -> CliResult<RunReport> {
    let log = Arc::new(EventLog::new("form").with_tracing(true));
    let mut page = PracticeFormPage::from_config(driver, config).with_observer(log.clone());
    let mut report = RunReport::new("form", page.form_url());
    report.trace_id = Some(log.trace_id().to_string());
    std::fs::create_dir_all(output)?;

    for &scenario in scenarios {
        let name = scenario.as_str();
        tracing::info!(scenario = name, "scenario start");
        let events_before = log.len();
        let start = Instant::now();
        let result = run_scenario(&mut page, scenario, seed).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let mut outcome = match result {
            Ok(detail) => CheckOutcome::passed(name, detail, duration_ms),
            Err(e) => {
                tracing::error!(scenario = name, error = %e, "scenario failed");
                let mut outcome = CheckOutcome::failed(name, e.to_string(), duration_ms);
                match page.screenshot().await {
                    Ok(shot) if shot.is_valid() => {
                        let path = output.join(format!("{name}-failure.png"));
                        match shot.save(&path) {
                            Ok(()) => outcome.screenshot = Some(path),
                            Err(e) => tracing::warn!(error = %e, "screenshot not saved"),
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "screenshot unavailable"),
                }
                outcome
            }
        };
        outcome.events = log.len() - events_before;
        report.push(outcome);
    }

    std::fs::write(
        output.join(format!("form-events-{}.json", log.trace_id())),
        log.to_json()?,
    )?;
    if let Err(e) = page.close().await {
        tracing::warn!(error = %e, "driver did not close cleanly");
    }
    Ok(report)
}

/// Run the user API contract checks
#[cfg(feature = "api")]
pub async fn run_api_suite(client: &formprobe::api::ReqresClient, seed: u64) -> RunReport {
    let mut report = RunReport::new("api", client.base_url());
    let checks =
        formprobe::api::suite::run_contract_suite(client, &mut StdRng::seed_from_u64(seed)).await;
    for check in checks {
        report.push(CheckOutcome {
            name: check.name,
            passed: check.passed,
            detail: check.detail,
            duration_ms: check.duration_ms,
            events: 0,
            screenshot: None,
        });
    }
    report
}

/// Generate fixture items as a JSON array
pub fn generate_fixtures(
    kind: FixtureKind,
    count: usize,
    seed: u64,
) -> serde_json::Result<serde_json::Value> {
    let mut rng = StdRng::seed_from_u64(seed);
    let items = (0..count)
        .map(|_| match kind {
            FixtureKind::Record => serde_json::to_value(generate_valid_record(&mut rng)),
            FixtureKind::User => serde_json::to_value(generate_new_user(&mut rng)),
        })
        .collect::<serde_json::Result<Vec<_>>>()?;
    Ok(serde_json::Value::Array(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formprobe::{SimulatedForm, Timeouts};

    #[test]
    fn test_fixtures_are_seeded() {
        let a = generate_fixtures(FixtureKind::Record, 3, 9).unwrap();
        let b = generate_fixtures(FixtureKind::Record, 3, 9).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_array().map(Vec::len), Some(3));
        assert!(a[0]["first_name"].is_string());
    }

    #[test]
    fn test_user_fixtures() {
        let users = generate_fixtures(FixtureKind::User, 2, 1).unwrap();
        assert!(users[1]["job"].is_string());
    }

    #[tokio::test]
    async fn test_form_suite_writes_events() {
        let dir = tempfile::tempdir().unwrap();
        let config = SuiteConfig::default().with_timeouts(Timeouts::tight());
        let sim = SimulatedForm::new(config.layout());

        let report = run_form_suite(
            sim.clone(),
            &config,
            &[ScenarioName::Minimal, ScenarioName::Invalid],
            1,
            dir.path(),
        )
        .await
        .unwrap();

        assert_eq!(report.passed(), 2);
        assert!(report.outcomes.iter().all(|o| o.events > 0));
        let trace_id = report.trace_id.clone().unwrap();
        assert!(dir
            .path()
            .join(format!("form-events-{trace_id}.json"))
            .exists());
        assert!(sim.was_called("close"));
    }

    #[tokio::test]
    async fn test_failed_scenario_gets_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = SuiteConfig::default().with_timeouts(Timeouts::tight());
        let sim = SimulatedForm::new(config.layout()).with_echo_override("Student Name", "Nobody");

        let report = run_form_suite(sim, &config, &[ScenarioName::Minimal], 1, dir.path())
            .await
            .unwrap();

        assert_eq!(report.failed(), 1);
        let shot = report.outcomes[0].screenshot.clone().unwrap();
        assert!(shot.exists());
    }
}
