//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling the training
//! loop to specific output formats or metrics.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Summary of one finished training episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Index of the episode (0-based)
    pub episode: usize,
    /// Cumulative reward collected during the episode
    pub reward: f64,
    /// Number of steps taken
    pub steps: usize,
    /// Whether the step budget ended the episode
    pub truncated: bool,
}

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_snapshots)` - Once, before the first snapshot
/// 2. `on_snapshot(index, elapsed)` - Every time a value table snapshot is taken
/// 3. `on_episode_end(summary)` - After every finished episode
/// 4. `on_training_end()` - Once, after the last snapshot
///
/// # Examples
///
/// ```
/// use tdlab::ports::{EpisodeSummary, TrainingObserver};
///
/// struct CountEpisodes(usize);
///
/// impl TrainingObserver for CountEpisodes {
///     fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> tdlab::Result<()> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait TrainingObserver: Send {
    /// Called before the first snapshot.
    fn on_training_start(&mut self, _total_snapshots: usize) -> Result<()> {
        Ok(())
    }

    /// Called when a snapshot is taken.
    ///
    /// `elapsed` is the number of episodes or steps (whichever the snapshot
    /// period counts) trained so far.
    fn on_snapshot(&mut self, _index: usize, _elapsed: usize) -> Result<()> {
        Ok(())
    }

    /// Called after an episode ends, whether terminal or truncated.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called after the last snapshot has been produced.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
