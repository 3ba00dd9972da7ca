//! Tabular temporal-difference control
//!
//! This crate provides:
//! - Domain and task ports for discrete Markov environments
//! - A value table, ε-greedy policy and the SARSA / Expected SARSA /
//!   Q-learning / SARSA(λ) update family
//! - A training loop yielding value table snapshots and a greedy evaluator
//! - Multi-trial experiments reduced with streaming statistics and
//!   Student's-t confidence intervals
//! - A grid world domain and linear value-function extension point

pub mod analysis;
pub mod cli;
pub mod envs;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod ports;
pub mod td;
pub mod vfa;

pub use analysis::{SeriesPoint, StatisticsAggregator};
pub use error::{Error, Result};
pub use ports::{Domain, Task};
pub use td::{EpsilonGreedy, LearningParams, TdAgent, UpdateRule, ValueTable};
