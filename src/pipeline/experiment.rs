//! Multi-trial experiments with confidence intervals
//!
//! Every trial trains an independent agent, evaluates each snapshot greedily
//! and yields one score per snapshot index. Trials run in parallel; their
//! series are folded into the aggregator in trial order, so the result only
//! depends on the configuration.

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    analysis::{DEFAULT_SIGNIFICANCE, SeriesPoint, StatisticsAggregator},
    pipeline::{
        evaluation::{EvaluationConfig, Evaluator},
        training::{TrainingConfig, TrainingLoop},
    },
    ports::{Domain, Task},
    td::{LearningParams, TdAgent, UpdateRule},
};

/// Mixed into trial seeds so evaluation draws from its own stream
const EVALUATION_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Experiment configuration
///
/// Every trial derives its training and evaluation seeds from `seed`, so
/// `training.seed` and `evaluation.seed` are ignored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Independent training runs
    pub trials: usize,

    /// Significance level of the confidence half-widths
    pub significance: f64,

    /// Base seed; trial `i` uses `seed + i`
    pub seed: u64,

    pub rule: UpdateRule,
    pub learning: LearningParams,
    pub training: TrainingConfig,
    pub evaluation: EvaluationConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            significance: DEFAULT_SIGNIFICANCE,
            seed: 0,
            rule: UpdateRule::default(),
            learning: LearningParams::default(),
            training: TrainingConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_rule(mut self, rule: UpdateRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_learning(mut self, learning: LearningParams) -> Self {
        self.learning = learning;
        self
    }

    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    pub fn with_evaluation(mut self, evaluation: EvaluationConfig) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Seed of trial `trial`
    pub fn trial_seed(&self, trial: usize) -> u64 {
        self.seed.wrapping_add(trial as u64)
    }

    /// # Errors
    ///
    /// - [`Error::InsufficientTrials`] for fewer than two trials
    /// - [`Error::InvalidConfiguration`] for any other out-of-range value
    pub fn validate(&self) -> Result<()> {
        if self.trials < 2 {
            return Err(Error::InsufficientTrials {
                trials: self.trials,
            });
        }
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(Error::invalid_config(format!(
                "significance must be within (0, 1), got {}",
                self.significance
            )));
        }
        self.rule.validate()?;
        self.learning.validate()?;
        self.training.validate()?;
        self.evaluation.validate()
    }
}

/// Learning curve of an experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub trials: usize,
    pub series: Vec<SeriesPoint>,
}

impl ExperimentResult {
    /// Last point of the curve
    pub fn final_point(&self) -> Option<&SeriesPoint> {
        self.series.last()
    }
}

/// Runs the trials of one experiment
///
/// `factory` builds a fresh domain and task from a seed; it is called once
/// for training and once per evaluated snapshot.
pub struct Experiment<F> {
    config: ExperimentConfig,
    factory: F,
    progress: Option<ProgressBar>,
}

impl<F, D, T> Experiment<F>
where
    F: Fn(u64) -> Result<(D, T)> + Sync,
    D: Domain,
    T: Task<D>,
{
    pub fn new(config: ExperimentConfig, factory: F) -> Result<Self> {
        config.validate()?;
        if config.training.seed.is_some() || config.evaluation.seed.is_some() {
            warn!(
                seed = config.seed,
                "training and evaluation seeds are ignored; trials derive them from the experiment seed"
            );
        }
        Ok(Self {
            config,
            factory,
            progress: None,
        })
    }

    /// Advance `progress` by one for every finished trial
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Train and evaluate one trial, returning its score per snapshot
    pub fn run_trial(&self, trial: usize) -> Result<Vec<f64>> {
        let config = &self.config;
        let seed = config.trial_seed(trial);
        let evaluation_seed = seed ^ EVALUATION_STREAM;

        let (domain, task) = (self.factory)(seed)?;
        let agent = TdAgent::new(domain, task, config.rule, config.learning)?;
        let training = TrainingLoop::new(agent, config.training.clone().with_seed(seed))?;
        let evaluator = Evaluator::new(
            config.evaluation.clone().with_seed(evaluation_seed),
            config.learning,
        )?;

        let mut series = Vec::with_capacity(config.training.snapshots);
        for snapshot in training {
            let snapshot = snapshot?;
            let (domain, task) =
                (self.factory)(evaluation_seed.wrapping_add(snapshot.index as u64))?;
            let outcome = evaluator.evaluate(domain, task, &snapshot.table)?;
            series.push(outcome.mean_reward);
        }

        debug!(
            trial,
            seed,
            final_reward = series.last().copied().unwrap_or_default(),
            "trial finished"
        );
        if let Some(progress) = &self.progress {
            progress.inc(1);
        }
        Ok(series)
    }

    /// Run every trial and reduce them to a learning curve
    pub fn run(&self) -> Result<ExperimentResult> {
        let config = &self.config;
        info!(
            trials = config.trials,
            rule = config.rule.label(),
            snapshots = config.training.snapshots,
            "experiment started"
        );

        let trial_series = (0..config.trials)
            .into_par_iter()
            .map(|trial| self.run_trial(trial))
            .collect::<Result<Vec<_>>>()?;

        let mut aggregator =
            StatisticsAggregator::new(config.training.snapshots, config.significance)?;
        for series in &trial_series {
            aggregator.record_trial(series)?;
        }
        let series = aggregator.finish()?;

        if let Some(last) = series.last() {
            info!(
                mean = last.mean,
                half_width = last.half_width,
                "experiment finished"
            );
        }
        if let Some(progress) = &self.progress {
            progress.finish();
        }

        Ok(ExperimentResult {
            trials: aggregator.trials(),
            series,
        })
    }
}

/// Convenience wrapper around [`Experiment::run`]
pub fn run_experiment<F, D, T>(config: ExperimentConfig, factory: F) -> Result<ExperimentResult>
where
    F: Fn(u64) -> Result<(D, T)> + Sync,
    D: Domain,
    T: Task<D>,
{
    Experiment::new(config, factory)?.run()
}
