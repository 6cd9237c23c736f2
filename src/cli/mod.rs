//! CLI command handling
//!
//! Dispatches CLI commands and formats output.

use std::path::{Path, PathBuf};

use colored::Colorize;
use tokio_util::sync::CancellationToken;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::page::SiteModel;
use crate::report::{ConsoleReporter, ReportCollector, ScenarioReport};
use crate::scenario::{load_scenario, run_scenario, ScenarioRunner};

/// Load the configuration file given on the command line, or the default one
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Whether `command` should run with debug logging
pub fn verbose(command: &Commands, config: &Config) -> bool {
    match command {
        Commands::Run { verbose, .. } => *verbose || config.output.verbose,
        Commands::Validate { .. } => config.output.verbose,
    }
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    if !config.output.color {
        colored::control::set_override(false);
    }
    let verbose = verbose(&command, config);

    match command {
        Commands::Run { paths, json, .. } => run(&paths, verbose, json, config).await,

        Commands::Validate { paths } => validate(&paths),
    }
}

async fn run(paths: &[PathBuf], verbose: bool, json: bool, config: &Config) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling scenario");
            on_interrupt.cancel();
        }
    });

    let runner = ScenarioRunner::with_cancellation(cancel.clone());

    if json {
        let mut reports = Vec::new();
        let result = run_collecting(paths, config, &runner, &mut reports).await;
        // Whatever ran before an error is still reported
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return result;
    }

    let mut failed = 0;
    for path in paths {
        let mut reporter = ConsoleReporter::stdout(verbose);
        let outcome = run_scenario(path, config, &runner, &mut reporter).await?;
        if let Some(e) = reporter.take_error() {
            return Err(e.into());
        }

        if !outcome.is_success() {
            failed += 1;
        }
        if cancel.is_cancelled() {
            break;
        }
    }
    check_failures(failed, paths.len())
}

async fn run_collecting(
    paths: &[PathBuf],
    config: &Config,
    runner: &ScenarioRunner,
    reports: &mut Vec<ScenarioReport>,
) -> Result<()> {
    let mut failed = 0;
    for path in paths {
        let mut collector = ReportCollector::new();
        let outcome = run_scenario(path, config, runner, &mut collector).await?;
        reports.push(collector.into_report());

        if !outcome.is_success() {
            failed += 1;
        }
        if runner.cancellation().is_cancelled() {
            break;
        }
    }
    check_failures(failed, paths.len())
}

fn check_failures(failed: usize, total: usize) -> Result<()> {
    if failed > 0 {
        return Err(Error::ScenariosFailed { failed, total });
    }
    Ok(())
}

fn validate(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        let scenario = load_scenario(path)?;
        SiteModel::load(&scenario.site)?;
        println!(
            "{} {} ({}, {} steps)",
            "✓".green(),
            path.display(),
            scenario.name,
            scenario.steps.len()
        );
    }
    Ok(())
}
