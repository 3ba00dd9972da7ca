//! Ports (trait boundaries) for external collaborators.
//!
//! The learning core is written against these traits only. Concrete
//! environments and observation sinks are adapters that implement them.

pub mod domain;
pub mod observer;
pub mod task;

pub use domain::{Domain, Key};
pub use observer::{EpisodeSummary, TrainingObserver};
pub use task::Task;
