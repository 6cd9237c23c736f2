//! Scenario runner CLI
//!
//! Runs YAML-described UI scenarios against scripted site models and reports
//! each assertion.

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use scenario_runner::common::logging;
use scenario_runner::{cli, commands, Result};

#[derive(Parser)]
#[command(name = "scenario-runner", about = "Scripted UI scenario runner")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli::load_config(cli.config.as_deref())?;
    logging::init_cli(cli::verbose(&cli.command, &config));

    cli::dispatch(cli.command, &config).await
}
