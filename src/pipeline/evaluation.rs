//! Greedy evaluation of value table snapshots

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Error, Result,
    ports::{Domain, Task},
    td::{DEFAULT_STEP_BUDGET, LearningParams, TdAgent, UpdateRule, ValueTable},
};

/// Evaluation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Episodes averaged per evaluation
    pub episodes: usize,

    /// Maximum steps per evaluation episode
    pub step_budget: usize,

    /// Random seed for tie-breaking
    pub seed: Option<u64>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            episodes: 10,
            step_budget: DEFAULT_STEP_BUDGET,
            seed: None,
        }
    }
}

impl EvaluationConfig {
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_step_budget(mut self, step_budget: usize) -> Self {
        self.step_budget = step_budget;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.episodes == 0 {
            return Err(Error::invalid_config(
                "evaluation needs at least one episode",
            ));
        }
        if self.step_budget == 0 {
            return Err(Error::invalid_config("step budget must be positive"));
        }
        Ok(())
    }
}

/// Outcome of evaluating one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub episodes: usize,
    /// Mean cumulative reward per episode
    pub mean_reward: f64,
    pub mean_steps: f64,
    /// Episodes cut short by the step budget
    pub truncated: usize,
}

/// Runs a frozen greedy copy of a policy
///
/// The agent acts with ε = 0, keeping uniform tie-breaking, and never
/// writes to its table. The evaluated table is cloned, so the caller's
/// snapshot is left as is.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EvaluationConfig,
    params: LearningParams,
}

impl Evaluator {
    /// `params` supplies γ and the initial value; α and ε are forced to 0
    pub fn new(config: EvaluationConfig, params: LearningParams) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            params: params.frozen(),
        })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluate `table` on a fresh domain and task
    pub fn evaluate<D, T>(
        &self,
        domain: D,
        task: T,
        table: &ValueTable<D::State, D::Action>,
    ) -> Result<EvaluationOutcome>
    where
        D: Domain,
        T: Task<D>,
    {
        let mut agent = TdAgent::new(domain, task, UpdateRule::Sarsa, self.params)?
            .with_table(table.clone())
            .with_step_budget(self.config.step_budget)?;
        if let Some(seed) = self.config.seed {
            agent = agent.with_seed(seed);
        }

        let mut total_reward = 0.0;
        let mut total_steps = 0;
        let mut truncated = 0;
        for _ in 0..self.config.episodes {
            let summary = agent.run_episode()?;
            total_reward += summary.reward;
            total_steps += summary.steps;
            if summary.truncated {
                truncated += 1;
            }
        }

        let episodes = self.config.episodes;
        let outcome = EvaluationOutcome {
            episodes,
            mean_reward: total_reward / episodes as f64,
            mean_steps: total_steps as f64 / episodes as f64,
            truncated,
        };
        debug!(
            mean_reward = outcome.mean_reward,
            truncated, "evaluation finished"
        );
        Ok(outcome)
    }
}
