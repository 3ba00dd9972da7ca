//! Train command - Train one agent and evaluate its snapshots

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use serde::Serialize;

use crate::{
    cli::{
        config::{CommonArgs, RunConfig, grid_factory},
        output::{format_number, print_kv, print_section, print_subsection},
    },
    envs::render_policy,
    export::write_json,
    pipeline::{
        Evaluator, JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver,
        SnapshotPeriod, TrainingLoop,
    },
    td::TdAgent,
};

use super::sanitize_summary_path;

#[derive(Parser, Debug)]
#[command(about = "Train one agent and evaluate its snapshots", allow_negative_numbers = true)]
pub struct TrainArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Episodes between snapshots
    #[arg(long)]
    pub period: Option<usize>,

    /// Number of snapshots, including the untrained one
    #[arg(long)]
    pub snapshots: Option<usize>,

    /// Greedy evaluation episodes per snapshot
    #[arg(long)]
    pub eval_episodes: Option<usize>,

    /// Optional file for JSONL episode summaries
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,
}

impl TrainArgs {
    fn resolve(&self) -> Result<RunConfig> {
        let mut config = self.common.overlay()?;
        let training = &mut config.experiment.training;
        if let Some(period) = self.period {
            training.period = SnapshotPeriod::Episodes(period);
        }
        if let Some(snapshots) = self.snapshots {
            training.snapshots = snapshots;
        }
        if let Some(episodes) = self.eval_episodes {
            config.experiment.evaluation.episodes = episodes;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct SnapshotRow {
    index: usize,
    episodes: usize,
    steps: usize,
    mean_reward: f64,
    truncated: usize,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    config: RunConfig,
    snapshots: Vec<SnapshotRow>,
    metrics: MetricsSummary,
    policy: String,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.resolve()?;
    let experiment = &config.experiment;
    let seed = experiment.seed;
    let factory = grid_factory(config.grid.clone());
    let map = config.grid.map()?;

    print_section("Training");
    print_kv("Rule", experiment.rule.label());
    print_kv(
        "Grid",
        &format!(
            "{}x{}, exit {}, {} pits",
            config.grid.width,
            config.grid.height,
            config.grid.exit,
            config.grid.pits.len()
        ),
    );
    print_kv(
        "α / γ / ε",
        &format!(
            "{} / {} / {}",
            experiment.learning.learning_rate,
            experiment.learning.discount,
            experiment.learning.epsilon
        ),
    );
    print_kv("Seed", &seed.to_string());

    let (world, task) = factory(seed)?;
    let agent = TdAgent::new(world, task, experiment.rule, experiment.learning)?;
    let metrics = MetricsObserver::new();
    let mut training = TrainingLoop::new(agent, experiment.training.clone().with_seed(seed))?
        .with_observer(Box::new(metrics.clone()));
    if args.progress {
        training = training.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        training = training.with_observer(Box::new(JsonlObserver::new(path)?));
    }

    let evaluator = Evaluator::new(
        experiment.evaluation.clone().with_seed(seed),
        experiment.learning,
    )?;

    let mut rows = Vec::with_capacity(experiment.training.snapshots);
    let mut final_table = None;
    for snapshot in training {
        let snapshot = snapshot?;
        let (world, task) = factory(seed.wrapping_add(snapshot.index as u64))?;
        let outcome = evaluator.evaluate(world, task, &snapshot.table)?;
        rows.push(SnapshotRow {
            index: snapshot.index,
            episodes: snapshot.episodes,
            steps: snapshot.steps,
            mean_reward: outcome.mean_reward,
            truncated: outcome.truncated,
        });
        final_table = Some(snapshot.table);
    }
    let final_table = final_table.ok_or_else(|| anyhow!("training produced no snapshots"))?;

    print_subsection("Greedy evaluation");
    println!(
        "  {:>6} {:>10} {:>12} {:>10}",
        "index", "episodes", "mean reward", "truncated"
    );
    for row in &rows {
        println!(
            "  {:>6} {:>10} {:>12.3} {:>10}",
            row.index,
            format_number(row.episodes),
            row.mean_reward,
            row.truncated
        );
    }

    let summary = metrics.summary();
    print_subsection("Training episodes");
    print_kv("Episodes", &format_number(summary.episodes));
    print_kv("Steps", &format_number(summary.total_steps));
    print_kv("Mean reward", &format!("{:.3}", summary.mean_reward));
    print_kv(
        "Truncated",
        &format!(
            "{} ({:.1}%)",
            summary.truncated,
            summary.truncation_rate * 100.0
        ),
    );

    let policy = render_policy(&map, &final_table);
    print_subsection("Greedy policy");
    print!("{policy}");

    if let Some(path) = &args.summary {
        let path = sanitize_summary_path(path, "training_summary.json");
        let file = TrainingSummaryFile {
            config: config.clone(),
            snapshots: rows,
            metrics: summary,
            policy,
        };
        write_json(&file, &path)?;
        println!("\n✓ Summary saved to: {}", path.display());
    }

    Ok(())
}
