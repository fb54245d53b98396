//! Standard (z) scaling of one-dimensional series.

use ndarray::{Array1, ArrayView1};

use crate::descriptive::{check_finite, mean_std};
use crate::error::{StatsError, StatsResult};

/// Centers on the mean and divides by the population standard deviation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl StandardScaler {
    /// Fit on a series. A zero or non-finite spread is reported as
    /// `DegenerateScale` rather than silently dividing by one.
    pub fn fit(values: &[f64]) -> StatsResult<Self> {
        check_finite(values)?;
        if values.len() < 2 {
            return Err(StatsError::InsufficientSamples {
                needed: 2,
                got: values.len(),
            });
        }
        let (mean, scale) = mean_std(ArrayView1::from(values));
        if !(scale.is_finite() && scale > 0.0) {
            return Err(StatsError::DegenerateScale(scale));
        }
        Ok(Self { mean, scale })
    }

    pub fn transform_one(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }

    pub fn transform(&self, values: &[f64]) -> Array1<f64> {
        values.iter().map(|&v| self.transform_one(v)).collect()
    }

    pub fn fit_transform(values: &[f64]) -> StatsResult<(Self, Array1<f64>)> {
        let scaler = Self::fit(values)?;
        let scaled = scaler.transform(values);
        Ok((scaler, scaled))
    }
}
