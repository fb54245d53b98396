//! Pluggable machine-learned outlier vote.
//!
//! The anomaly engine asks an `OutlierDetector` for one of its four votes.
//! The default is an isolation forest; tests and alternative deployments can
//! inject any other implementation through `PriceAnomalyEngine::with_detector`.

use procurement_stats::{IsolationForest, IsolationForestConfig, StandardScaler, StatsResult};

use crate::config::OutlierConfig;
use crate::util;

/// Decides whether a point is an outlier relative to a training sample.
pub trait OutlierDetector: Send + Sync {
    /// `training` and `point` are already standardized by the caller.
    fn is_outlier(&self, training: &[f64], point: f64) -> StatsResult<bool>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

/// Fits a fresh seeded isolation forest per call.
pub struct IsolationForestDetector {
    config: IsolationForestConfig,
}

impl IsolationForestDetector {
    pub fn new(config: IsolationForestConfig) -> Self {
        Self { config }
    }
}

impl From<&OutlierConfig> for IsolationForestDetector {
    fn from(config: &OutlierConfig) -> Self {
        Self::new(IsolationForestConfig::from(config))
    }
}

impl Default for IsolationForestDetector {
    fn default() -> Self {
        Self::new(IsolationForestConfig::default())
    }
}

impl OutlierDetector for IsolationForestDetector {
    fn is_outlier(&self, training: &[f64], point: f64) -> StatsResult<bool> {
        let forest = IsolationForest::fit(training, &self.config)?;
        Ok(forest.is_outlier(point))
    }
}

/// Standardize history and current price together, then ask the detector
/// whether the scaled current price is an outlier among the scaled history.
pub fn scaled_outlier_vote(
    detector: &dyn OutlierDetector,
    history: &[f64],
    current: f64,
) -> StatsResult<bool> {
    let mut series = Vec::with_capacity(history.len() + 1);
    series.extend_from_slice(history);
    series.push(current);

    let (_, scaled) = StandardScaler::fit_transform(&series)?;
    let scaled = scaled.to_vec();
    let (training, point) = scaled.split_at(history.len());
    detector.is_outlier(training, point[0])
}
