//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Formprobe: practice-form scenarios and user API contract checks
#[derive(Parser, Debug)]
#[command(name = "formprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "FORMPROBE_LOG_JSON")]
    pub log_json: bool,

    /// Suite configuration file (YAML)
    #[arg(short, long, global = true, env = "FORMPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run practice form scenarios
    Form(FormArgs),

    /// Run the user API contract checks
    Api(ApiArgs),

    /// Print generated fixture data as JSON
    Fixtures(FixturesArgs),

    /// Show the effective configuration as YAML
    Config,
}

/// Named practice form scenarios
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioName {
    /// Required fields only
    Minimal,
    /// Every field, including subjects, hobbies and state/city
    Complete,
    /// The two fixture users back to back
    Users,
    /// A seeded random record
    Generated,
    /// Long, short, punctuated and non-ASCII names
    Boundary,
    /// Malformed record is rejected before the page is touched
    Invalid,
    /// A leftover confirmation modal is cleared before the next interaction
    Guard,
}

impl ScenarioName {
    /// Every scenario, in run order
    pub const ALL: [Self; 7] = [
        Self::Minimal,
        Self::Complete,
        Self::Users,
        Self::Generated,
        Self::Boundary,
        Self::Invalid,
        Self::Guard,
    ];

    /// Report name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Complete => "complete",
            Self::Users => "users",
            Self::Generated => "generated",
            Self::Boundary => "boundary",
            Self::Invalid => "invalid",
            Self::Guard => "guard",
        }
    }
}

/// Arguments for the form command
#[derive(Args, Debug)]
pub struct FormArgs {
    /// Scenarios to run (repeatable; default all)
    #[arg(short, long, value_enum)]
    pub scenario: Vec<ScenarioName>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Run against the in-process simulated form instead of chromium
    #[arg(long)]
    pub simulated: bool,

    /// Form host base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Seed for generated records
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Output directory for reports and failure screenshots
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the api command
#[derive(Args, Debug)]
pub struct ApiArgs {
    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Value for the x-api-key header
    #[arg(long, env = "REQRES_API_KEY")]
    pub api_key: Option<String>,

    /// Seed for generated payloads
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Output directory for the report
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Kind of fixture to generate
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixtureKind {
    /// Practice form record
    #[default]
    Record,
    /// `POST /users` payload
    User,
}

/// Arguments for the fixtures command
#[derive(Args, Debug)]
pub struct FixturesArgs {
    /// RNG seed; omitted means a fresh random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of items
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// What to generate
    #[arg(long, value_enum, default_value = "record")]
    pub kind: FixtureKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_form_scenarios_repeat() {
        let cli = Cli::parse_from([
            "formprobe", "form", "-s", "minimal", "-s", "guard", "--simulated",
        ]);
        match cli.command {
            Commands::Form(args) => {
                assert_eq!(args.scenario, vec![ScenarioName::Minimal, ScenarioName::Guard]);
                assert!(args.simulated);
                assert!(!args.headed);
                assert_eq!(args.seed, 42);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["formprobe", "fixtures", "-vv", "--seed", "7", "-n", "3"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Fixtures(args) => {
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.count, 3);
                assert_eq!(args.kind, FixtureKind::Record);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_scenario_names_match_value_enum() {
        for scenario in ScenarioName::ALL {
            let parsed = ScenarioName::from_str(scenario.as_str(), false).unwrap();
            assert_eq!(parsed, scenario);
        }
    }
}
