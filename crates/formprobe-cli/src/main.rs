//! Formprobe CLI: practice form scenarios and user API contract checks
//!
//! ## Usage
//!
//! ```bash
//! formprobe form                          # All scenarios in headless chromium
//! formprobe form -s minimal -s guard      # Selected scenarios
//! formprobe form --simulated              # Against the in-process form
//! formprobe api --api-key reqres-free-v1  # REST contract checks
//! formprobe fixtures --seed 7 -n 3        # Generated records as JSON
//! ```

use clap::Parser;
use formprobe::{SimulatedForm, SuiteConfig, Timeouts};
use formprobe_cli::runner::{generate_fixtures, run_form_suite};
use formprobe_cli::{
    logging, ApiArgs, Cli, CliConfig, CliResult, Commands, FixturesArgs, FormArgs, RunReport,
    ScenarioName,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    logging::init(&config);

    match cli.command {
        Commands::Form(args) => run_form(&config, &args),
        Commands::Api(args) => run_api(&config, &args),
        Commands::Fixtures(args) => run_fixtures(&args),
        Commands::Config => run_config(&config),
    }
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn output_dir(requested: Option<&PathBuf>, suite: &SuiteConfig) -> PathBuf {
    requested
        .cloned()
        .unwrap_or_else(|| PathBuf::from(&suite.output_dir))
}

fn finish(config: &CliConfig, report: RunReport, output: &Path) -> CliResult<()> {
    if !config.verbosity.is_quiet() {
        report.print_summary();
    }
    let path = report.write(output)?;
    tracing::info!(path = %path.display(), "report written");
    report.into_result()
}

fn run_form(config: &CliConfig, args: &FormArgs) -> CliResult<()> {
    let mut suite = config.suite_config()?;
    if let Some(url) = &args.base_url {
        suite.form_base_url.clone_from(url);
    }
    if args.headed {
        suite.browser.headless = false;
    }
    if args.simulated {
        suite.timeouts = Timeouts::tight();
    }
    suite.validate()?;

    let output = output_dir(args.output.as_ref(), &suite);
    let scenarios = if args.scenario.is_empty() {
        ScenarioName::ALL.to_vec()
    } else {
        args.scenario.clone()
    };

    let rt = runtime()?;
    let report = if args.simulated {
        let driver = SimulatedForm::new(suite.layout());
        rt.block_on(run_form_suite(driver, &suite, &scenarios, args.seed, &output))?
    } else {
        rt.block_on(run_in_chromium(&suite, &scenarios, args.seed, &output))?
    };
    finish(config, report, &output)
}

#[cfg(feature = "browser")]
async fn run_in_chromium(
    suite: &SuiteConfig,
    scenarios: &[ScenarioName],
    seed: u64,
    output: &Path,
) -> CliResult<RunReport> {
    let driver = formprobe::CdpDriver::launch(&suite.browser).await?;
    run_form_suite(driver, suite, scenarios, seed, output).await
}

#[cfg(not(feature = "browser"))]
async fn run_in_chromium(
    _suite: &SuiteConfig,
    _scenarios: &[ScenarioName],
    _seed: u64,
    _output: &Path,
) -> CliResult<RunReport> {
    Err(formprobe_cli::CliError::FeatureDisabled { feature: "browser" })
}

#[cfg(feature = "api")]
fn run_api(config: &CliConfig, args: &ApiArgs) -> CliResult<()> {
    let mut suite = config.suite_config()?;
    if let Some(url) = &args.base_url {
        suite.api_base_url.clone_from(url);
    }
    if args.api_key.is_some() {
        suite.api_key.clone_from(&args.api_key);
    }
    suite.validate()?;

    let output = output_dir(args.output.as_ref(), &suite);
    let client = formprobe::api::ReqresClient::from_config(&suite);
    let report = runtime()?.block_on(formprobe_cli::runner::run_api_suite(&client, args.seed));
    finish(config, report, &output)
}

#[cfg(not(feature = "api"))]
fn run_api(_config: &CliConfig, _args: &ApiArgs) -> CliResult<()> {
    Err(formprobe_cli::CliError::FeatureDisabled { feature: "api" })
}

fn run_fixtures(args: &FixturesArgs) -> CliResult<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::debug!(seed, count = args.count, kind = ?args.kind, "generating fixtures");
    let items = generate_fixtures(args.kind, args.count, seed)?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

fn run_config(config: &CliConfig) -> CliResult<()> {
    let suite = config.suite_config()?;
    print!("{}", serde_yaml_ng::to_string(&suite)?);
    Ok(())
}
