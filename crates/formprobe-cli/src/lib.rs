//! Formprobe CLI library
//!
//! Argument parsing, configuration, logging setup, scenario runners and
//! reports for the `formprobe` binary.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod commands;
mod config;
mod error;
pub mod logging;
mod report;
pub mod runner;
pub mod scenarios;

pub use commands::{ApiArgs, Cli, Commands, FixtureKind, FixturesArgs, FormArgs, ScenarioName};
pub use config::{CliConfig, Verbosity};
pub use error::{CliError, CliResult};
pub use report::{CheckOutcome, RunReport};
