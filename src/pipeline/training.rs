//! Training loop yielding periodic value table snapshots

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Error, Result,
    ports::{Domain, EpisodeSummary, Key, Task, TrainingObserver},
    td::{DEFAULT_STEP_BUDGET, StepOutcome, TdAgent, ValueTable},
};

/// How much training happens between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPeriod {
    /// Completed episodes (terminal or truncated)
    Episodes(usize),
    /// Environment steps; episodes may straddle snapshots
    Steps(usize),
}

impl SnapshotPeriod {
    /// Episodes or steps per period
    pub fn size(&self) -> usize {
        match *self {
            SnapshotPeriod::Episodes(n) | SnapshotPeriod::Steps(n) => n,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SnapshotPeriod::Episodes(_) => "episodes",
            SnapshotPeriod::Steps(_) => "steps",
        }
    }
}

impl Default for SnapshotPeriod {
    fn default() -> Self {
        SnapshotPeriod::Episodes(50)
    }
}

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Training between snapshots
    pub period: SnapshotPeriod,

    /// Number of snapshots, including the untrained one at index 0
    pub snapshots: usize,

    /// Maximum steps per episode
    pub step_budget: usize,

    /// Random seed for action selection
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            period: SnapshotPeriod::default(),
            snapshots: 20,
            step_budget: DEFAULT_STEP_BUDGET,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn with_period(mut self, period: SnapshotPeriod) -> Self {
        self.period = period;
        self
    }

    pub fn with_snapshots(mut self, snapshots: usize) -> Self {
        self.snapshots = snapshots;
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

    /// Total episodes or steps trained by the last snapshot
    pub fn total_training(&self) -> usize {
        self.period.size() * self.snapshots.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.period.size() == 0 {
            return Err(Error::invalid_config("snapshot period must be positive"));
        }
        if self.snapshots == 0 {
            return Err(Error::invalid_config("at least one snapshot is required"));
        }
        if self.step_budget == 0 {
            return Err(Error::invalid_config("step budget must be positive"));
        }
        Ok(())
    }
}

/// Deep copy of the value table at one point of training
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<S: Key, A: Key> {
    pub index: usize,
    /// Episodes completed when the snapshot was taken
    pub episodes: usize,
    /// Steps taken when the snapshot was taken
    pub steps: usize,
    pub table: ValueTable<S, A>,
}

/// Drives one agent and yields a snapshot every period
///
/// The first item is the untrained table at index 0; the iterator ends
/// right after the configured number of snapshots without finishing any
/// episode in flight. An error ends the iteration.
///
/// # Examples
///
/// ```
/// use tdlab::envs::GridWorldConfig;
/// use tdlab::pipeline::{SnapshotPeriod, TrainingConfig, TrainingLoop};
/// use tdlab::td::{LearningParams, TdAgent, UpdateRule};
///
/// let (world, task) = GridWorldConfig::default().build().unwrap();
/// let agent = TdAgent::new(world, task, UpdateRule::QLearning, LearningParams::default()).unwrap();
/// let config = TrainingConfig::default()
///     .with_period(SnapshotPeriod::Episodes(5))
///     .with_snapshots(3)
///     .with_seed(1);
///
/// let snapshots = TrainingLoop::new(agent, config)
///     .unwrap()
///     .collect::<tdlab::Result<Vec<_>>>()
///     .unwrap();
/// assert_eq!(snapshots.len(), 3);
/// assert!(snapshots[0].table.is_empty());
/// assert_eq!(snapshots[2].episodes, 10);
/// ```
pub struct TrainingLoop<D: Domain, T: Task<D>> {
    agent: TdAgent<D, T>,
    config: TrainingConfig,
    observers: Vec<Box<dyn TrainingObserver>>,
    next_index: usize,
    finished: bool,
}

impl<D: Domain, T: Task<D>> TrainingLoop<D, T> {
    /// Wrap `agent`, applying the configured step budget and seed
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` is invalid.
    pub fn new(agent: TdAgent<D, T>, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let mut agent = agent.with_step_budget(config.step_budget)?;
        if let Some(seed) = config.seed {
            agent = agent.with_seed(seed);
        }
        Ok(Self {
            agent,
            config,
            observers: Vec::new(),
            next_index: 0,
            finished: false,
        })
    }

    /// Add an observer to the loop
    pub fn with_observer(mut self, observer: Box<dyn TrainingObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn agent(&self) -> &TdAgent<D, T> {
        &self.agent
    }

    pub fn into_agent(self) -> TdAgent<D, T> {
        self.agent
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    fn notify_episode(&mut self, summary: &EpisodeSummary) -> Result<()> {
        debug!(
            episode = summary.episode,
            reward = summary.reward,
            steps = summary.steps,
            truncated = summary.truncated,
            "episode finished"
        );
        for observer in &mut self.observers {
            observer.on_episode_end(summary)?;
        }
        Ok(())
    }

    /// Train for one snapshot period
    fn train_period(&mut self) -> Result<()> {
        match self.config.period {
            SnapshotPeriod::Episodes(episodes) => {
                for _ in 0..episodes {
                    let summary = self.agent.run_episode()?;
                    self.notify_episode(&summary)?;
                }
            }
            SnapshotPeriod::Steps(steps) => {
                for _ in 0..steps {
                    let step = self.agent.act()?;
                    if step.outcome != StepOutcome::Continuing {
                        let summary = self.agent.episode_ended();
                        self.notify_episode(&summary)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn next_snapshot(&mut self) -> Result<Snapshot<D::State, D::Action>> {
        let index = self.next_index;
        if index == 0 {
            info!(
                rule = self.agent.rule().label(),
                snapshots = self.config.snapshots,
                period = self.config.period.size(),
                unit = self.config.period.unit(),
                "training started"
            );
            for observer in &mut self.observers {
                observer.on_training_start(self.config.snapshots)?;
            }
        } else {
            self.train_period()?;
        }

        let snapshot = Snapshot {
            index,
            episodes: self.agent.episodes_completed(),
            steps: self.agent.total_steps(),
            table: self.agent.snapshot(),
        };
        debug!(
            index,
            episodes = snapshot.episodes,
            entries = snapshot.table.len(),
            "snapshot taken"
        );

        let elapsed = index * self.config.period.size();
        for observer in &mut self.observers {
            observer.on_snapshot(index, elapsed)?;
        }

        self.next_index += 1;
        if self.next_index == self.config.snapshots {
            self.finished = true;
            for observer in &mut self.observers {
                observer.on_training_end()?;
            }
            info!(
                episodes = self.agent.episodes_completed(),
                steps = self.agent.total_steps(),
                "training finished"
            );
        }
        Ok(snapshot)
    }
}

impl<D: Domain, T: Task<D>> Iterator for TrainingLoop<D, T> {
    type Item = Result<Snapshot<D::State, D::Action>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.next_snapshot();
        if item.is_err() {
            self.finished = true;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.finished {
            0
        } else {
            self.config.snapshots - self.next_index
        };
        (0, Some(remaining))
    }
}
