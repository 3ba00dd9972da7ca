//! Experiment command - Many independent trials with confidence intervals

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use crate::{
    cli::{
        config::{CommonArgs, RunConfig, grid_factory},
        output::{create_trial_progress, format_series_table, print_kv, print_section},
    },
    export::{SeriesCsvExporter, write_json},
    pipeline::{Experiment, ExperimentResult, SnapshotPeriod},
};

use super::sanitize_summary_path;

#[derive(Parser, Debug)]
#[command(
    about = "Run independent trials and report the mean learning curve",
    allow_negative_numbers = true
)]
pub struct ExperimentArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Number of independent trials (at least 2)
    #[arg(long, short = 'n')]
    pub trials: Option<usize>,

    /// Episodes between snapshots
    #[arg(long)]
    pub period: Option<usize>,

    /// Count the period in environment steps instead of episodes
    #[arg(long)]
    pub period_in_steps: bool,

    /// Number of snapshots, including the untrained one
    #[arg(long)]
    pub snapshots: Option<usize>,

    /// Greedy evaluation episodes per snapshot
    #[arg(long)]
    pub eval_episodes: Option<usize>,

    /// Significance level of the confidence half-width
    #[arg(long)]
    pub significance: Option<f64>,

    /// Write the learning curve as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,
}

impl ExperimentArgs {
    fn resolve(&self) -> Result<RunConfig> {
        let mut config = self.common.overlay()?;
        let experiment = &mut config.experiment;
        if let Some(trials) = self.trials {
            experiment.trials = trials;
        }
        let period = self.period.unwrap_or(experiment.training.period.size());
        if self.period.is_some() || self.period_in_steps {
            experiment.training.period = if self.period_in_steps {
                SnapshotPeriod::Steps(period)
            } else {
                SnapshotPeriod::Episodes(period)
            };
        }
        if let Some(snapshots) = self.snapshots {
            experiment.training.snapshots = snapshots;
        }
        if let Some(episodes) = self.eval_episodes {
            experiment.evaluation.episodes = episodes;
        }
        if let Some(significance) = self.significance {
            experiment.significance = significance;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct ExperimentSummaryFile {
    config: RunConfig,
    result: ExperimentResult,
}

pub fn execute(args: ExperimentArgs) -> Result<()> {
    let config = args.resolve()?;
    let experiment = &config.experiment;

    print_section("Experiment");
    print_kv("Rule", experiment.rule.label());
    print_kv("Trials", &experiment.trials.to_string());
    print_kv(
        "Snapshots",
        &format!(
            "{} every {} {}",
            experiment.training.snapshots,
            experiment.training.period.size(),
            experiment.training.period.unit()
        ),
    );
    print_kv("Significance", &experiment.significance.to_string());
    print_kv("Seed", &experiment.seed.to_string());

    let mut runner = Experiment::new(experiment.clone(), grid_factory(config.grid.clone()))?;
    if args.progress {
        runner = runner.with_progress(create_trial_progress(experiment.trials as u64));
    }
    let result = runner.run()?;

    println!();
    print!(
        "{}",
        format_series_table(
            &result.series,
            experiment.training.period.size(),
            experiment.training.period.unit()
        )
    );

    if let Some(path) = &args.csv {
        let rows = SeriesCsvExporter::export(&result.series, path)?;
        println!("\n✓ {rows} rows written to: {}", path.display());
    }

    if let Some(path) = &args.summary {
        let path = sanitize_summary_path(path, "experiment_summary.json");
        let file = ExperimentSummaryFile {
            config: config.clone(),
            result,
        };
        write_json(&file, &path)?;
        println!("✓ Summary saved to: {}", path.display());
    }

    Ok(())
}
