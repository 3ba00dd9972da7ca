//! Analysis tools for learning curves
//!
//! Streaming statistics that reduce many independent trials to a mean
//! learning curve with Student's-t confidence intervals.

pub mod stats;

pub use stats::{
    DEFAULT_SIGNIFICANCE, RunningStats, SeriesPoint, StatisticsAggregator, half_width,
};
