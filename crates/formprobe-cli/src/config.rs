//! CLI configuration

use crate::commands::Cli;
use crate::error::{CliError, CliResult};
use formprobe::SuiteConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Default log filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "info",
            Self::Verbose => "formprobe=debug,info",
            Self::Debug => "debug",
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Emit JSON log lines
    pub log_json: bool,
    /// Suite configuration file
    pub config_path: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CliConfig {
    /// Create default configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            log_json: false,
            config_path: None,
        }
    }

    /// Build from parsed arguments
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        let verbosity = if cli.quiet {
            Verbosity::Quiet
        } else {
            match cli.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Debug,
            }
        };
        Self {
            verbosity,
            log_json: cli.log_json,
            config_path: cli.config.clone(),
        }
    }

    /// Load the suite configuration, falling back to defaults without a file
    pub fn suite_config(&self) -> CliResult<SuiteConfig> {
        let config = match &self.config_path {
            Some(path) => load_file(path)?,
            None => SuiteConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }
}

fn load_file(path: &Path) -> CliResult<SuiteConfig> {
    if !path.exists() {
        return Err(CliError::config(format!(
            "config file {} does not exist",
            path.display()
        )));
    }
    Ok(SuiteConfig::load(path)?)
}
