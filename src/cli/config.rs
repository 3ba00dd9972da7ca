//! Shared configuration types for CLI commands

use std::{fs::File, path::Path};

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    envs::{GridPosition, GridWorld, GridWorldConfig, ReachExit},
    pipeline::ExperimentConfig,
    td::UpdateRule,
};

/// Complete run configuration, as read from `--config`
///
/// Missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub grid: GridWorldConfig,
    pub experiment: ExperimentConfig,
}

impl RunConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {}", path.display()),
            source,
        })?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.experiment.validate()
    }
}

/// Domain factory: a fresh grid world and task with seeded slip randomness
pub fn grid_factory(
    grid: GridWorldConfig,
) -> impl Fn(u64) -> Result<(GridWorld, ReachExit)> + Sync {
    move |seed| {
        let (world, task) = grid.build()?;
        Ok((world.with_seed(seed), task))
    }
}

/// Update rule selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleKind {
    Sarsa,
    ExpectedSarsa,
    QLearning,
    SarsaLambda,
}

/// Options shared by every command; each one overrides the config file
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// TD-control update rule
    #[arg(long, value_enum)]
    pub rule: Option<RuleKind>,

    /// Trace decay for sarsa-lambda
    #[arg(long)]
    pub lambda: Option<f64>,

    /// Learning rate α
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Discount factor γ
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Exploration probability ε
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Value of never-updated state-action pairs
    #[arg(long)]
    pub initial_value: Option<f64>,

    /// Grid width
    #[arg(long)]
    pub width: Option<usize>,

    /// Grid height
    #[arg(long)]
    pub height: Option<usize>,

    /// Exit cell as `x,y` (defaults to the top-right corner when the size changes)
    #[arg(long, value_parser = parse_position)]
    pub exit: Option<GridPosition>,

    /// Pit cell as `x,y`; repeat for several pits
    #[arg(long = "pit", value_parser = parse_position)]
    pub pits: Vec<GridPosition>,

    /// Chance that a move goes in a random direction
    #[arg(long)]
    pub slip: Option<f64>,

    /// Maximum steps per episode
    #[arg(long)]
    pub step_budget: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

impl CommonArgs {
    /// Load `--config` (or defaults), apply the flag overrides and validate
    pub fn resolve(&self) -> Result<RunConfig> {
        let config = self.overlay()?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`resolve`](Self::resolve), leaving validation to the caller
    pub fn overlay(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut RunConfig) {
        let experiment = &mut config.experiment;
        let lambda = self.lambda.or(experiment.rule.trace_decay()).unwrap_or(0.9);
        match self.rule {
            Some(RuleKind::Sarsa) => experiment.rule = UpdateRule::Sarsa,
            Some(RuleKind::ExpectedSarsa) => experiment.rule = UpdateRule::ExpectedSarsa,
            Some(RuleKind::QLearning) => experiment.rule = UpdateRule::QLearning,
            Some(RuleKind::SarsaLambda) => experiment.rule = UpdateRule::SarsaLambda { lambda },
            None => {
                if let UpdateRule::SarsaLambda { lambda: current } = &mut experiment.rule {
                    *current = lambda;
                }
            }
        }

        let learning = &mut experiment.learning;
        if let Some(alpha) = self.alpha {
            learning.learning_rate = alpha;
        }
        if let Some(gamma) = self.gamma {
            learning.discount = gamma;
        }
        if let Some(epsilon) = self.epsilon {
            learning.epsilon = epsilon;
        }
        if let Some(initial_value) = self.initial_value {
            learning.initial_value = initial_value;
        }
        if let Some(step_budget) = self.step_budget {
            experiment.training.step_budget = step_budget;
            experiment.evaluation.step_budget = step_budget;
        }
        if let Some(seed) = self.seed {
            experiment.seed = seed;
        }
        // The run seed drives training and evaluation
        experiment.training.seed = None;
        experiment.evaluation.seed = None;

        let grid = &mut config.grid;
        if self.width.is_some() || self.height.is_some() {
            grid.width = self.width.unwrap_or(grid.width);
            grid.height = self.height.unwrap_or(grid.height);
            grid.exit = GridPosition::new(
                grid.width.saturating_sub(1),
                grid.height.saturating_sub(1),
            );
        }
        if let Some(exit) = self.exit {
            grid.exit = exit;
        }
        if !self.pits.is_empty() {
            grid.pits = self.pits.clone();
        }
        if let Some(slip) = self.slip {
            grid.slip_probability = slip;
        }
    }
}

/// Parse `x,y` into a grid position
pub fn parse_position(value: &str) -> std::result::Result<GridPosition, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid coordinate '{part}': {e}"))
    };
    Ok(GridPosition::new(parse(x)?, parse(y)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("2, 3"), Ok(GridPosition::new(2, 3)));
        assert!(parse_position("2").is_err());
        assert!(parse_position("a,1").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = CommonArgs {
            rule: Some(RuleKind::SarsaLambda),
            lambda: Some(0.7),
            alpha: Some(0.5),
            width: Some(5),
            step_budget: Some(80),
            ..CommonArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.experiment.rule, UpdateRule::SarsaLambda { lambda: 0.7 });
        assert_eq!(config.experiment.learning.learning_rate, 0.5);
        assert_eq!(config.grid.width, 5);
        assert_eq!(config.grid.exit, GridPosition::new(4, 2));
        assert_eq!(config.experiment.evaluation.step_budget, 80);
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(
            &path,
            r#"{
                "grid": { "width": 4, "height": 4, "exit": { "x": 3, "y": 3 } },
                "experiment": {
                    "trials": 3,
                    "rule": { "kind": "q_learning" },
                    "training": { "seed": 99 },
                    "evaluation": { "seed": 7 }
                }
            }"#,
        )
        .unwrap();

        let args = CommonArgs {
            config: Some(path),
            epsilon: Some(0.2),
            ..CommonArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.grid.width, 4);
        assert_eq!(config.experiment.trials, 3);
        assert_eq!(config.experiment.rule, UpdateRule::QLearning);
        assert_eq!(config.experiment.learning.epsilon, 0.2);
        assert_eq!(config.experiment.training.seed, None);
        assert_eq!(config.experiment.evaluation.seed, None);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = CommonArgs {
            epsilon: Some(3.0),
            ..CommonArgs::default()
        };
        assert!(args.resolve().is_err());
    }
}
