//! Descriptive statistics over price series.
//!
//! Conventions follow the usual numerical-computing defaults so results line
//! up with spreadsheet and notebook checks:
//! - standard deviation is the population form (divide by `n`)
//! - percentiles interpolate linearly between closest ranks
//! - the median is the 50th percentile

use ndarray::ArrayView1;

use crate::error::{StatsError, StatsResult};

/// Summary of a price series.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

impl Summary {
    /// Compute the summary of a non-empty, all-finite series.
    pub fn of(values: &[f64]) -> StatsResult<Self> {
        check_finite(values)?;
        if values.is_empty() {
            return Err(StatsError::InsufficientSamples { needed: 1, got: 0 });
        }

        let view = ArrayView1::from(values);
        let (mean, std_dev) = mean_std(view);

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Ok(Self {
            count: values.len(),
            mean,
            std_dev,
            median: percentile_sorted(&sorted, 50.0),
            q1: percentile_sorted(&sorted, 25.0),
            q3: percentile_sorted(&sorted, 75.0),
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Tukey fence `[q1 - k*iqr, q3 + k*iqr]`.
    pub fn iqr_fence(&self, multiplier: f64) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - multiplier * iqr, self.q3 + multiplier * iqr)
    }
}

/// Mean and population standard deviation. Returns `(0, 0)` for empty input.
pub fn mean_std(values: ArrayView1<f64>) -> (f64, f64) {
    match values.mean() {
        Some(mean) => (mean, values.std(0.0)),
        None => (0.0, 0.0),
    }
}

/// Percentile `p` in `[0, 100]` with linear interpolation.
pub fn percentile(values: &[f64], p: f64) -> StatsResult<f64> {
    check_finite(values)?;
    if values.is_empty() {
        return Err(StatsError::InsufficientSamples { needed: 1, got: 0 });
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(StatsError::InvalidParameter(format!(
            "percentile {p} outside [0, 100]"
        )));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(percentile_sorted(&sorted, p))
}

/// Median with the same interpolation rule as [`percentile`].
pub fn median(values: &[f64]) -> StatsResult<f64> {
    percentile(values, 50.0)
}

/// Percentile over an already sorted, non-empty slice.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Reject NaN and infinities, reporting the first offending index.
pub fn check_finite(values: &[f64]) -> StatsResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(StatsError::NonFinite(idx)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_population_std() {
        let (mean, std) = mean_std(ArrayView1::from(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0][..]));
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_series_mean_std_is_zero() {
        let empty: [f64; 0] = [];
        assert_eq!(mean_std(ArrayView1::from(&empty[..])), (0.0, 0.0));
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
    }

    #[test]
    fn percentile_interpolates_linearly() {
        // sorted: 1 2 3 4 5 -> rank for p25 = 1.0 exactly
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_eq!(percentile(&values, 25.0).unwrap(), 2.0);
        assert_eq!(percentile(&values, 75.0).unwrap(), 4.0);
        // four values: rank for p25 = 0.75 -> 10 + 0.75 * 10
        let values = [10.0, 20.0, 30.0, 40.0];
        assert!((percentile(&values, 25.0).unwrap() - 17.5).abs() < 1e-12);
        assert!((percentile(&values, 75.0).unwrap() - 32.5).abs() < 1e-12);
    }

    #[test]
    fn percentile_rejects_out_of_range() {
        assert!(matches!(
            percentile(&[1.0], 120.0),
            Err(StatsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn summary_rejects_nan() {
        assert_eq!(
            Summary::of(&[1.0, f64::NAN]),
            Err(StatsError::NonFinite(1))
        );
    }

    #[test]
    fn summary_fence() {
        let s = Summary::of(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        let (lo, hi) = s.iqr_fence(1.5);
        assert!((lo - (17.5 - 1.5 * 15.0)).abs() < 1e-12);
        assert!((hi - (32.5 + 1.5 * 15.0)).abs() < 1e-12);
    }
}
