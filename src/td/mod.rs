//! Tabular temporal difference control
//!
//! A single [`TdAgent`] learns a [`ValueTable`] over state-action pairs while
//! acting ε-greedily. The bootstrapping target is chosen by the injected
//! [`UpdateRule`].
//!
//! ## Update rules
//!
//! | Rule | Target for non-terminal s' | Policy |
//! |------|----------------------------|--------|
//! | SARSA | Q(s', a') for the action actually taken next | on-policy |
//! | Expected SARSA | Σ π(a' \| s') Q(s', a') under ε-greedy | on-policy |
//! | Q-learning | max Q(s', ·) | off-policy |
//! | SARSA(λ) | SARSA target, error spread by replacing traces | on-policy |
//!
//! A terminal successor always contributes zero future value.
//!
//! ## Usage Example
//!
//! ```no_run
//! use tdlab::envs::GridWorldConfig;
//! use tdlab::td::{LearningParams, TdAgent, UpdateRule};
//!
//! let (world, task) = GridWorldConfig::default().build().unwrap();
//! let params = LearningParams::default().with_learning_rate(0.5);
//! let mut agent = TdAgent::new(world, task, UpdateRule::Sarsa, params)
//!     .unwrap()
//!     .with_seed(7);
//! for _ in 0..100 {
//!     agent.run_episode().unwrap();
//! }
//! ```

pub mod agent;
pub mod params;
pub mod policy;
pub mod traces;
pub mod update;
pub mod value_table;

pub use agent::{DEFAULT_STEP_BUDGET, EpisodePhase, Step, StepOutcome, TdAgent};
pub use params::LearningParams;
pub use policy::EpsilonGreedy;
pub use traces::EligibilityTraces;
pub use update::{NextState, Transition, UpdateRule};
pub use value_table::ValueTable;
