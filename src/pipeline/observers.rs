//! Observer implementations for training loops
//!
//! Observers allow composable data collection during training without coupling
//! the loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{EpisodeSummary, TrainingObserver},
};

/// Progress bar observer - Shows snapshot progress and recent reward
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    episodes: usize,
    reward_sum: f64,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            episodes: 0,
            reward_sum: 0.0,
        }
    }

    fn message(&self) -> String {
        if self.episodes == 0 {
            String::from("no episodes yet")
        } else {
            format!(
                "{} episodes, mean reward {:.2}",
                self.episodes,
                self.reward_sum / self.episodes as f64
            )
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingObserver for ProgressObserver {
    fn on_training_start(&mut self, total_snapshots: usize) -> Result<()> {
        let pb = ProgressBar::new(total_snapshots as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} snapshots ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_snapshot(&mut self, index: usize, _elapsed: usize) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(index as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.episodes += 1;
        self.reward_sum += summary.reward;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub truncated: usize,
    pub total_steps: usize,
    pub mean_reward: f64,
    pub mean_steps: f64,
    pub truncation_rate: f64,
    /// Reward of the most recent episode
    pub last_reward: Option<f64>,
}

#[derive(Debug, Default)]
struct Counters {
    episodes: usize,
    truncated: usize,
    total_steps: usize,
    reward_sum: f64,
    last_reward: Option<f64>,
}

/// Metrics observer - Tracks episode metrics
///
/// Clones share their counters, so a clone kept by the caller can read the
/// metrics after the original has been boxed into a training loop.
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    counters: Arc<Mutex<Counters>>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        let counters = self.counters();
        let per_episode = |total: f64| {
            if counters.episodes == 0 {
                0.0
            } else {
                total / counters.episodes as f64
            }
        };
        MetricsSummary {
            episodes: counters.episodes,
            truncated: counters.truncated,
            total_steps: counters.total_steps,
            mean_reward: per_episode(counters.reward_sum),
            mean_steps: per_episode(counters.total_steps as f64),
            truncation_rate: per_episode(counters.truncated as f64),
            last_reward: counters.last_reward,
        }
    }
}

impl TrainingObserver for MetricsObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        let mut counters = self.counters();
        counters.episodes += 1;
        counters.total_steps += summary.steps;
        counters.reward_sum += summary.reward;
        counters.last_reward = Some(summary.reward);
        if summary.truncated {
            counters.truncated += 1;
        }
        Ok(())
    }
}

/// JSONL observer - Writes one episode summary per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create episode log {}", path.display()),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl TrainingObserver for JsonlObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        serde_json::to_writer(&mut self.writer, summary)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
