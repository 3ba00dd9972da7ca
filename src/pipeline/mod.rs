//! Training and evaluation pipeline
//!
//! This module provides composable pipelines for:
//! - Training an agent while taking periodic value table snapshots
//! - Evaluating snapshots with a frozen greedy policy
//! - Running many independent trials and aggregating their learning curves
//! - Recording observations during training

pub mod evaluation;
pub mod experiment;
pub mod observers;
pub mod training;

pub use evaluation::{EvaluationConfig, EvaluationOutcome, Evaluator};
pub use experiment::{Experiment, ExperimentConfig, ExperimentResult, run_experiment};
pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use training::{Snapshot, SnapshotPeriod, TrainingConfig, TrainingLoop};

pub use crate::ports::{EpisodeSummary, TrainingObserver};
