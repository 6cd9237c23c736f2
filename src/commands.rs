//! CLI command definitions
//!
//! Defines the clap commands for the scenario runner CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run scenario files against their site models
    Run {
        /// Paths to YAML scenario files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print every step, not only assertions and failures
        #[arg(long, short)]
        verbose: bool,

        /// Print a JSON report instead of console output
        #[arg(long)]
        json: bool,
    },

    /// Load and validate scenario files and their site models without running them
    Validate {
        /// Paths to YAML scenario files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}
