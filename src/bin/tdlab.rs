//! tdlab CLI - Train TD-control agents and measure their learning curves
//!
//! This CLI provides a unified interface for:
//! - Training a single agent and inspecting its greedy policy
//! - Running many independent trials with confidence intervals
//! - Exporting learning curves for plotting

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tdlab")]
#[command(version, about = "Tabular TD-control experiments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train one agent and evaluate its snapshots
    Train(Box<tdlab::cli::commands::train::TrainArgs>),

    /// Run independent trials and report the mean learning curve
    Experiment(Box<tdlab::cli::commands::experiment::ExperimentArgs>),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => tdlab::cli::commands::train::execute(*args),
        Commands::Experiment(args) => tdlab::cli::commands::experiment::execute(*args),
    }
}
