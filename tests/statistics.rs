use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use tdlab::{
    Error, StatisticsAggregator,
    analysis::{DEFAULT_SIGNIFICANCE, RunningStats, half_width},
};

const SAMPLE: [f64; 8] = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

fn stats_of(values: &[f64]) -> RunningStats {
    let mut stats = RunningStats::new();
    for &x in values {
        stats.push(x);
    }
    stats
}

#[test]
fn textbook_sample_in_any_order() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut values = SAMPLE;
    for _ in 0..20 {
        values.shuffle(&mut rng);
        let stats = stats_of(&values);
        assert!((stats.mean() - 5.0).abs() < 1e-12);
        assert!((stats.variance().unwrap() - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(stats.min(), Some(2.0));
        assert_eq!(stats.max(), Some(9.0));
    }
}

#[test]
fn streaming_matches_two_pass() {
    let mut rng = StdRng::seed_from_u64(9);
    let values: Vec<f64> = (0..500).map(|_| rng.random_range(-50.0..150.0)).collect();

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);

    let stats = stats_of(&values);
    assert!((stats.mean() - mean).abs() < 1e-9);
    assert!((stats.variance().unwrap() - variance).abs() < 1e-6);
}

#[test]
fn half_width_shrinks_with_more_trials() {
    let mut previous = f64::INFINITY;
    for n in [2, 3, 5, 10, 30, 100, 1000] {
        let hw = half_width(4.0, n, DEFAULT_SIGNIFICANCE).unwrap();
        assert!(hw < previous, "half-width grew at n = {n}");
        previous = hw;
    }
}

#[test]
fn half_width_of_textbook_sample() {
    let hw = half_width(32.0 / 7.0, 8, 0.05).unwrap();
    assert!((hw - 1.432158).abs() < 1e-5, "got {hw}");
    assert_eq!(half_width(0.0, 8, 0.05).unwrap(), 0.0);
}

#[test]
fn aggregator_reduces_trials_per_index() {
    let mut aggregator = StatisticsAggregator::new(2, 0.05).unwrap();
    for (i, &x) in SAMPLE.iter().enumerate() {
        aggregator.record_trial(&[x, i as f64]).unwrap();
    }
    assert_eq!(aggregator.trials(), 8);

    let series = aggregator.finish().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].index, 0);
    assert!((series[0].mean - 5.0).abs() < 1e-12);
    assert!((series[0].variance - 32.0 / 7.0).abs() < 1e-12);
    assert!((series[1].mean - 3.5).abs() < 1e-12);
    assert!(series[0].half_width > 0.0);
}

#[test]
fn aggregator_refuses_a_single_trial() {
    let mut aggregator = StatisticsAggregator::new(3, 0.05).unwrap();
    aggregator.record_trial(&[1.0, 2.0, 3.0]).unwrap();
    assert!(matches!(
        aggregator.finish(),
        Err(Error::InsufficientTrials { trials: 1 })
    ));
}

#[test]
fn aggregator_rejects_mismatched_series_untouched() {
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
