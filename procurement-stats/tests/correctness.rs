//! Correctness tests for procurement-stats.
//!
//! Validates that:
//! 1. Summaries of the reference laptop series match hand-computed values
//! 2. Scaling then fitting a forest ranks outliers the same as raw values
//! 3. Determinism: same inputs and seed always produce the same decisions

use procurement_stats::descriptive::Summary;
use procurement_stats::isolation_forest::{IsolationForest, IsolationForestConfig};
use procurement_stats::scaler::StandardScaler;

fn reference_series() -> Vec<f64> {
    vec![
        45000.0, 46000.0, 44000.0, 47000.0, 43000.0, 48000.0, 45000.0, 46000.0, 44500.0, 47500.0,
        45500.0, 46500.0,
    ]
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

#[test]
fn reference_summary() {
    let s = Summary::of(&reference_series()).unwrap();
    assert_eq!(s.count, 12);
    // 548,000 / 12
    assert!((s.mean - 45666.666_666).abs() < 1e-3);
    // sorted: 43000 44000 44500 45000 45000 45500 46000 46000 46500 47000 47500 48000
    assert!((s.median - 45750.0).abs() < 1e-9);
    // rank 2.75 -> 44500 + 0.75 * 500
    assert!((s.q1 - 44875.0).abs() < 1e-9);
    // rank 8.25 -> 46500 + 0.25 * 500
    assert!((s.q3 - 46625.0).abs() < 1e-9);
    assert!(s.std_dev > 1400.0 && s.std_dev < 1410.0);
}

#[test]
fn reference_fence_contains_every_observation() {
    let series = reference_series();
    let (lo, hi) = Summary::of(&series).unwrap().iqr_fence(1.5);
    assert!(series.iter().all(|&p| p >= lo && p <= hi));
    assert!(75000.0 > hi);
}

// ---------------------------------------------------------------------------
// Scaling + forest
// ---------------------------------------------------------------------------

#[test]
fn scaling_preserves_outlier_ranking() {
    let mut series = reference_series();
    series.push(75000.0);
    let (_, scaled) = StandardScaler::fit_transform(&series).unwrap();
    let scaled = scaled.to_vec();
    let (history, current) = scaled.split_at(scaled.len() - 1);

    let config = IsolationForestConfig::default();
    let raw_forest = IsolationForest::fit(&series[..series.len() - 1], &config).unwrap();
    let scaled_forest = IsolationForest::fit(history, &config).unwrap();

    assert_eq!(
        raw_forest.is_outlier(75000.0),
        scaled_forest.is_outlier(current[0])
    );
}

#[test]
fn forest_decisions_are_deterministic() {
    let config = IsolationForestConfig::default();
    let series = reference_series();
    let probes = [30000.0, 44000.0, 46000.0, 52000.0, 90000.0];

    let first: Vec<bool> = {
        let forest = IsolationForest::fit(&series, &config).unwrap();
        probes.iter().map(|&p| forest.is_outlier(p)).collect()
    };
    for _ in 0..5 {
        let forest = IsolationForest::fit(&series, &config).unwrap();
        let again: Vec<bool> = probes.iter().map(|&p| forest.is_outlier(p)).collect();
        assert_eq!(first, again);
    }
}

#[test]
fn different_seeds_may_differ_but_both_fit() {
    let series = reference_series();
    for seed in [1_u64, 7, 42, 1234] {
        let config = IsolationForestConfig {
            seed,
            ..IsolationForestConfig::default()
        };
        let forest = IsolationForest::fit(&series, &config).unwrap();
        assert!(forest.offset() < 0.0);
        assert!(forest.offset() > -1.0);
    }
}
