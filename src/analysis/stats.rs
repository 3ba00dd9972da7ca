//! Streaming statistics over independent trials
//!
//! Each trial yields one evaluation score per snapshot index. Scores are
//! folded into per-index running records with Welford's algorithm, so no
//! sample is ever stored.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::{Error, Result};

/// Default significance level for confidence half-widths
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Running count, mean and sum of squared deviations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample in
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        self.min = self.min.min(x);
        self.max = self.max.max(x);

        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance `M2 / (n − 1)`, `None` below two samples
    pub fn variance(&self) -> Option<f64> {
        (self.count >= 2).then(|| self.m2 / (self.count - 1) as f64)
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }
}

/// One row of the learning curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Snapshot index
    pub index: usize,
    pub mean: f64,
    /// Sample variance across trials
    pub variance: f64,
    /// Student's-t confidence half-width
    pub half_width: f64,
}

/// Confidence half-width `t(1 − significance, n − 1) · sqrt(variance / n)`
///
/// # Errors
///
/// - [`Error::InsufficientTrials`] if `n < 2`
/// - [`Error::Statistics`] if the t distribution cannot be built
///
/// # Examples
///
/// ```
/// use tdlab::analysis::half_width;
///
/// let narrow = half_width(4.0, 100, 0.05).unwrap();
/// let wide = half_width(4.0, 10, 0.05).unwrap();
/// assert!(narrow < wide);
/// ```
pub fn half_width(variance: f64, n: usize, significance: f64) -> Result<f64> {
    if n < 2 {
        return Err(Error::InsufficientTrials { trials: n });
    }
    let dist = StudentsT::new(0.0, 1.0, (n - 1) as f64).map_err(|e| Error::Statistics {
        message: e.to_string(),
    })?;
    let critical = dist.inverse_cdf(1.0 - significance);
    Ok(critical * variance.sqrt() / (n as f64).sqrt())
}

/// Per-snapshot-index running statistics across trials
///
/// A single writer folds trial series in; indices are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsAggregator {
    records: Vec<RunningStats>,
    significance: f64,
    trials: usize,
}

impl StatisticsAggregator {
    /// Track `len` snapshot indices
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] unless `0 < significance < 1`.
    pub fn new(len: usize, significance: f64) -> Result<Self> {
        if !(significance > 0.0 && significance < 1.0) {
            return Err(Error::invalid_config(format!(
                "significance must be within (0, 1), got {significance}"
            )));
        }
        Ok(Self {
            records: vec![RunningStats::default(); len],
            significance,
            trials: 0,
        })
    }

    /// Fold a whole trial's series in, element `j` at index `j`
    ///
    /// Every trial must score every snapshot index, so all indices share the
    /// same sample count. A rejected trial leaves the aggregator untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SeriesLength`] unless `series` has exactly one score
    /// per tracked index.
    pub fn record_trial(&mut self, series: &[f64]) -> Result<()> {
        if series.len() != self.records.len() {
            return Err(Error::SeriesLength {
                expected: self.records.len(),
                got: series.len(),
            });
        }
        for (record, &x) in self.records.iter_mut().zip(series) {
            record.push(x);
        }
        self.trials += 1;
        Ok(())
    }

    /// Number of trials recorded
    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn significance(&self) -> f64 {
        self.significance
    }

    pub fn record(&self, index: usize) -> Option<&RunningStats> {
        self.records.get(index)
    }

    /// Reduce every index to a [`SeriesPoint`]
    ///
    /// Each half-width uses the total trial count as `n`.
    ///
    /// # Errors
    ///
    /// - [`Error::InsufficientTrials`] for fewer than two trials
    /// - [`Error::Statistics`] if an index's sample count differs from the
    ///   trial count
    pub fn finish(&self) -> Result<Vec<SeriesPoint>> {
        if self.trials < 2 {
            return Err(Error::InsufficientTrials {
                trials: self.trials,
            });
        }
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                if record.count() != self.trials {
                    return Err(Error::Statistics {
                        message: format!(
                            "index {index} has {} samples for {} trials",
                            record.count(),
                            self.trials
                        ),
                    });
                }
                let variance = record.variance().ok_or(Error::InsufficientTrials {
                    trials: record.count(),
                })?;
                Ok(SeriesPoint {
                    index,
                    mean: record.mean(),
                    variance,
                    half_width: half_width(variance, self.trials, self.significance)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_welford_matches_textbook_sample() {
        let mut stats = RunningStats::new();
        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.push(x);
        }
        assert_eq!(stats.count(), 8);
        assert!(approx_eq(stats.mean(), 5.0, 1e-12));
        assert!(approx_eq(stats.variance().unwrap(), 32.0 / 7.0, 1e-12));
        assert_eq!(stats.min(), Some(2.0));
        assert_eq!(stats.max(), Some(9.0));
    }

    #[test]
    fn test_variance_needs_two_samples() {
        let mut stats = RunningStats::new();
        assert_eq!(stats.variance(), None);
        assert_eq!(stats.min(), None);
        stats.push(3.0);
        assert_eq!(stats.variance(), None);
    }

    #[test]
    fn test_half_width_value() {
        // t(0.95, 7) ≈ 1.894579
        let hw = half_width(32.0 / 7.0, 8, 0.05).unwrap();
        assert!(approx_eq(hw, 1.432158, 1e-4), "got {hw}");
    }

    #[test]
    fn test_half_width_rejects_single_trial() {
        assert!(matches!(
            half_width(1.0, 1, 0.05),
            Err(Error::InsufficientTrials { trials: 1 })
        ));
    }

    #[test]
    fn test_aggregator_series() {
        let mut aggregator = StatisticsAggregator::new(2, 0.05).unwrap();
        aggregator.record_trial(&[1.0, 10.0]).unwrap();
        aggregator.record_trial(&[3.0, 10.0]).unwrap();

        let series = aggregator.finish().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].index, 0);
        assert!(approx_eq(series[0].mean, 2.0, 1e-12));
        assert!(approx_eq(series[0].variance, 2.0, 1e-12));
        assert_eq!(series[1].variance, 0.0);
        assert_eq!(series[1].half_width, 0.0);
        assert_eq!(aggregator.trials(), 2);
    }

    #[test]
    fn test_aggregator_rejects_wrong_series_length() {
        let mut aggregator = StatisticsAggregator::new(2, 0.05).unwrap();
        assert!(matches!(
            aggregator.record_trial(&[1.0, 2.0, 3.0]),
            Err(Error::SeriesLength {
                expected: 2,
                got: 3
            })
        ));
        assert!(matches!(
            aggregator.record_trial(&[1.0]),
            Err(Error::SeriesLength {
                expected: 2,
                got: 1
            })
        ));
        assert_eq!(aggregator.trials(), 0);
        assert_eq!(aggregator.record(0).unwrap().count(), 0);
    }

    #[test]
    fn test_short_trial_keeps_counts_aligned() {
        let mut aggregator = StatisticsAggregator::new(2, 0.05).unwrap();
        assert!(aggregator.record_trial(&[1.0]).is_err());
        aggregator.record_trial(&[1.0, 4.0]).unwrap();
        aggregator.record_trial(&[3.0, 8.0]).unwrap();

        assert_eq!(aggregator.trials(), 2);
        for index in 0..2 {
            assert_eq!(aggregator.record(index).unwrap().count(), 2);
        }
        let series = aggregator.finish().unwrap();
        let expected = half_width(8.0, 2, 0.05).unwrap();
        assert!(approx_eq(series[1].half_width, expected, 1e-12));
    }

    #[test]
    fn test_finish_needs_two_trials() {
        let aggregator = StatisticsAggregator::new(1, 0.05).unwrap();
        assert!(matches!(
            aggregator.finish(),
            Err(Error::InsufficientTrials { trials: 0 })
        ));

        let mut aggregator = StatisticsAggregator::new(1, 0.05).unwrap();
        aggregator.record_trial(&[1.0]).unwrap();
        assert!(matches!(
            aggregator.finish(),
            Err(Error::InsufficientTrials { trials: 1 })
        ));
    }

    #[test]
    fn test_significance_range() {
        assert!(StatisticsAggregator::new(1, 0.0).is_err());
        assert!(StatisticsAggregator::new(1, 1.0).is_err());
    }
}
