//! Price anomaly engine.
//!
//! Four independent signals vote on each quoted price:
//!
//! | Signal             | Flags when                                        |
//! |--------------------|---------------------------------------------------|
//! | z-score            | `|price - mean| / std > z_score_threshold`         |
//! | IQR fence          | price outside `[q1 - k*iqr, q3 + k*iqr]`          |
//! | extreme deviation  | `|price - median| / median > extreme_deviation`  |
//! | outlier detector   | isolation forest on the standardized series      |
//!
//! A price is anomalous when at least `vote_threshold` signals agree.
//! Confidence blends the agreement share with the z-score magnitude, and the
//! risk ladder in `AnomalyConfig` turns confidence and price ratio into a
//! risk level.

use procurement_stats::Summary;

use crate::config::AnomalyConfig;
use crate::outlier::{scaled_outlier_vote, IsolationForestDetector, OutlierDetector};
use crate::types::{AnomalyReason, AnomalyVerdict, DetectionMethods, PriceBounds, PriceObservation};
use crate::util;

pub struct PriceAnomalyEngine {
    config: AnomalyConfig,
    detector: Box<dyn OutlierDetector>,
}

impl Default for PriceAnomalyEngine {
    fn default() -> Self {
        Self::new(AnomalyConfig::default())
    }
}

impl PriceAnomalyEngine {
    /// Engine with the default isolation forest detector built from `config.outlier`.
    pub fn new(config: AnomalyConfig) -> Self {
        let detector = Box::new(IsolationForestDetector::from(&config.outlier));
        Self { config, detector }
    }

    pub fn with_detector(config: AnomalyConfig, detector: Box<dyn OutlierDetector>) -> Self {
        Self { config, detector }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    /// Judge one observation against its history. Never fails.
    pub fn detect(&self, observation: &PriceObservation) -> AnomalyVerdict {
        self.detect_at(observation, util::timestamp_now())
    }

    fn detect_at(&self, observation: &PriceObservation, timestamp: String) -> AnomalyVerdict {
        let config = &self.config;
        let current = observation.current_price;

        let history: Vec<f64> = observation
            .historical_prices
            .iter()
            .copied()
            .filter(|p| p.is_finite())
            .collect();
        if history.len() != observation.historical_prices.len() {
            log::warn!(
                "Dropped {} non-finite historical prices for category '{}'",
                observation.historical_prices.len() - history.len(),
                observation.item_category
            );
        }

        if !current.is_finite() {
            log::warn!("Non-finite current price {}; skipping analysis", current);
            return AnomalyVerdict::insufficient_data(
                current,
                config.insufficient_data_confidence,
                timestamp,
            );
        }

        if history.len() < config.min_history {
            log::debug!(
                "Only {} historical prices for '{}' (need {})",
                history.len(),
                observation.item_category,
                config.min_history
            );
            return AnomalyVerdict::insufficient_data(
                current,
                config.insufficient_data_confidence,
                timestamp,
            );
        }

        let summary = match Summary::of(&history) {
            Ok(summary) => summary,
            Err(e) => {
                log::warn!("Could not summarize price history: {}", e);
                return AnomalyVerdict::insufficient_data(
                    current,
                    config.insufficient_data_confidence,
                    timestamp,
                );
            }
        };

        let z_score = if summary.std_dev > 0.0 {
            (current - summary.mean).abs() / summary.std_dev
        } else {
            0.0
        };
        let (lower_bound, upper_bound) = summary.iqr_fence(config.iqr_multiplier);

        let methods = DetectionMethods {
            z_score_flagged: z_score > config.z_score_threshold,
            iqr_flagged: current < lower_bound || current > upper_bound,
            extreme_deviation: is_extreme_deviation(current, summary.median, config.extreme_deviation_ratio),
            ml_flagged: self.ml_vote(&history, current),
        };

        let votes = methods.vote_count();
        let is_anomaly = votes >= config.vote_threshold;
        let confidence = confidence_score(votes, z_score, config);
        let reason = select_reason(current, &summary, &methods, config.reason_sigma_band);

        let price_ratio = if summary.mean > 0.0 {
            current / summary.mean
        } else {
            1.0
        };
        let (risk_level, risk_note) = config.assess_risk(confidence, price_ratio);

        let price_deviation_pct = if summary.mean != 0.0 {
            (current - summary.mean) / summary.mean * 100.0
        } else {
            0.0
        };

        if is_anomaly {
            log::info!(
                "Anomalous price {:.2} in '{}': {} votes, confidence {:.2}, {}",
                current,
                observation.item_category,
                votes,
                confidence,
                risk_level
            );
        }

        AnomalyVerdict {
            is_anomaly,
            confidence,
            reason,
            benchmark_price: summary.mean,
            median_price: Some(summary.median),
            price_deviation_pct,
            z_score: Some(z_score),
            risk_level,
            risk_note,
            detection_methods: Some(methods),
            price_bounds: Some(PriceBounds {
                lower_bound,
                upper_bound,
            }),
            analysis_timestamp: timestamp,
        }
    }

    /// Detector failures count as "not flagged".
    fn ml_vote(&self, history: &[f64], current: f64) -> bool {
        match scaled_outlier_vote(self.detector.as_ref(), history, current) {
            Ok(flagged) => flagged,
            Err(e) => {
                log::warn!(
                    "{} could not vote, treating as not flagged: {}",
                    self.detector.name(),
                    e
                );
                false
            }
        }
    }
}

/// `|price - median| / median > ratio`. Never flags when the median is not positive.
pub fn is_extreme_deviation(current: f64, median: f64, ratio: f64) -> bool {
    median > 0.0 && (current - median).abs() / median > ratio
}

/// Confidence in `[0, 1]` from the vote count and z-score magnitude.
pub fn confidence_score(votes: u32, z_score: f64, config: &AnomalyConfig) -> f64 {
    let agreement = votes as f64 / config.signal_count as f64;
    let magnitude = z_score.abs() / config.z_magnitude_scale;
    let raw = agreement * config.agreement_weight + magnitude * config.z_magnitude_weight;
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}

/// Reason text, picked by where the price sits relative to the mean.
pub fn select_reason(
    current: f64,
    summary: &Summary,
    methods: &DetectionMethods,
    sigma_band: f64,
) -> AnomalyReason {
    let band = sigma_band * summary.std_dev;
    if current > summary.mean + band {
        if methods.extreme_deviation {
            AnomalyReason::SignificantlyHigher
        } else {
            AnomalyReason::AboveNormalRange
        }
    } else if current < summary.mean - band {
        if methods.extreme_deviation {
            AnomalyReason::SignificantlyLower
        } else {
            AnomalyReason::BelowNormalRange
        }
    } else if methods.iqr_flagged {
        AnomalyReason::OutsideQuartileRange
    } else {
        AnomalyReason::MultipleIndicators
    }
}
