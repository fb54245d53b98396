//! Tunable parameters for the anomaly engine and the vendor scorer.
//!
//! Every struct deserializes with `#[serde(default)]`, so a config file only
//! needs the keys it overrides. Defaults come from
//! `procurement_stats::thresholds`.

use std::path::Path;

use procurement_stats::thresholds::*;
use procurement_stats::IsolationForestConfig;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{Recommendation, RiskLevel};

/// Tolerance when checking that the vendor weights sum to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Anomaly detection
// ---------------------------------------------------------------------------

/// One rung of the price risk ladder.
///
/// Matches when confidence reaches `min_confidence` and the price ratio
/// (current / historical mean) lies outside `[ratio_below, ratio_above]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskRule {
    pub level: RiskLevel,
    pub min_confidence: f64,
    pub ratio_above: f64,
    pub ratio_below: f64,
    pub note: String,
}

impl RiskRule {
    fn new(level: RiskLevel, min_confidence: f64, ratio_above: f64, ratio_below: f64, note: &str) -> Self {
        Self {
            level,
            min_confidence,
            ratio_above,
            ratio_below,
            note: note.to_string(),
        }
    }

    pub fn matches(&self, confidence: f64, price_ratio: f64) -> bool {
        confidence >= self.min_confidence
            && (price_ratio > self.ratio_above || price_ratio < self.ratio_below)
    }
}

/// Isolation forest settings as they appear in a config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub n_trees: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            n_trees: FOREST_TREES,
            max_samples: FOREST_MAX_SAMPLES,
            contamination: FOREST_CONTAMINATION,
            seed: FOREST_SEED,
        }
    }
}

impl From<&OutlierConfig> for IsolationForestConfig {
    fn from(config: &OutlierConfig) -> Self {
        IsolationForestConfig {
            n_trees: config.n_trees,
            max_samples: config.max_samples,
            contamination: config.contamination,
            seed: config.seed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub min_history: usize,
    pub insufficient_data_confidence: f64,
    pub z_score_threshold: f64,
    pub iqr_multiplier: f64,
    pub extreme_deviation_ratio: f64,
    pub reason_sigma_band: f64,
    pub vote_threshold: u32,
    pub signal_count: u32,
    pub agreement_weight: f64,
    pub z_magnitude_weight: f64,
    pub z_magnitude_scale: f64,
    pub low_confidence_cutoff: f64,
    pub low_confidence_note: String,
    /// Checked top to bottom; the first match wins.
    pub risk_rules: Vec<RiskRule>,
    pub default_risk_note: String,
    pub outlier: OutlierConfig,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_history: MIN_HISTORY_POINTS,
            insufficient_data_confidence: INSUFFICIENT_DATA_CONFIDENCE,
            z_score_threshold: Z_SCORE_THRESHOLD,
            iqr_multiplier: IQR_FENCE_MULTIPLIER,
            extreme_deviation_ratio: EXTREME_DEVIATION_RATIO,
            reason_sigma_band: REASON_SIGMA_BAND,
            vote_threshold: ANOMALY_VOTE_THRESHOLD,
            signal_count: ANOMALY_SIGNAL_COUNT,
            agreement_weight: AGREEMENT_WEIGHT,
            z_magnitude_weight: Z_MAGNITUDE_WEIGHT,
            z_magnitude_scale: Z_MAGNITUDE_SCALE,
            low_confidence_cutoff: LOW_CONFIDENCE_CUTOFF,
            low_confidence_note: "Insufficient data for assessment".to_string(),
            risk_rules: vec![
                RiskRule::new(
                    RiskLevel::VeryHigh,
                    VERY_HIGH_RISK_MIN_CONFIDENCE,
                    VERY_HIGH_RISK_RATIO_ABOVE,
                    VERY_HIGH_RISK_RATIO_BELOW,
                    "Strong indication of pricing anomaly",
                ),
                RiskRule::new(
                    RiskLevel::High,
                    HIGH_RISK_MIN_CONFIDENCE,
                    HIGH_RISK_RATIO_ABOVE,
                    HIGH_RISK_RATIO_BELOW,
                    "Likely pricing anomaly detected",
                ),
                RiskRule::new(
                    RiskLevel::Medium,
                    MEDIUM_RISK_MIN_CONFIDENCE,
                    MEDIUM_RISK_RATIO_ABOVE,
                    MEDIUM_RISK_RATIO_BELOW,
                    "Possible pricing irregularity",
                ),
            ],
            default_risk_note: "Price within acceptable variance".to_string(),
            outlier: OutlierConfig::default(),
        }
    }
}

impl AnomalyConfig {
    /// Walk the risk ladder for a verdict's confidence and price ratio.
    pub fn assess_risk(&self, confidence: f64, price_ratio: f64) -> (RiskLevel, String) {
        if confidence < self.low_confidence_cutoff {
            return (RiskLevel::Low, self.low_confidence_note.clone());
        }
        self.risk_rules
            .iter()
            .find(|rule| rule.matches(confidence, price_ratio))
            .map(|rule| (rule.level, rule.note.clone()))
            .unwrap_or_else(|| (RiskLevel::Low, self.default_risk_note.clone()))
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.min_history == 0 {
            return Err(EngineError::InvalidConfig(
                "anomaly.min_history must be > 0".into(),
            ));
        }
        if self.signal_count == 0 {
            return Err(EngineError::InvalidConfig(
                "anomaly.signal_count must be > 0".into(),
            ));
        }
        if self.vote_threshold > self.signal_count {
            return Err(EngineError::InvalidConfig(format!(
                "anomaly.vote_threshold={} exceeds signal_count={}",
                self.vote_threshold, self.signal_count
            )));
        }
        if !(self.z_magnitude_scale > 0.0) {
            return Err(EngineError::InvalidConfig(
                "anomaly.z_magnitude_scale must be > 0".into(),
            ));
        }
        IsolationForestConfig::from(&self.outlier)
            .validate()
            .map_err(|e| EngineError::InvalidConfig(format!("anomaly.outlier: {}", e)))
    }
}

// ---------------------------------------------------------------------------
// Vendor scoring
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub delivery: f64,
    pub price: f64,
    pub reviews: f64,
    pub compliance: f64,
    pub fulfillment: f64,
    pub response: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            delivery: WEIGHT_DELIVERY,
            price: WEIGHT_PRICE,
            reviews: WEIGHT_REVIEWS,
            compliance: WEIGHT_COMPLIANCE,
            fulfillment: WEIGHT_FULFILLMENT,
            response: WEIGHT_RESPONSE,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.delivery + self.price + self.reviews + self.compliance + self.fulfillment + self.response
    }
}

/// Step in a piecewise-constant scoring table: values up to `up_to` score `score`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreStep {
    pub up_to: f64,
    pub score: f64,
}

/// Score of the first step whose `up_to` covers `value`, else `floor`.
pub fn step_score(steps: &[ScoreStep], value: f64, floor: f64) -> f64 {
    steps
        .iter()
        .find(|step| value <= step.up_to)
        .map(|step| step.score)
        .unwrap_or(floor)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CertificationBonus {
    /// Matched case-insensitively as a substring of the certification name.
    pub label: String,
    pub bonus: f64,
}

/// Overall-score band mapping to a risk level and recommendation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub min_score: f64,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorScoringConfig {
    pub weights: ScoreWeights,
    pub default_delivery_score: f64,
    pub default_price_score: f64,
    pub default_review_score: f64,
    pub default_fulfillment_score: f64,
    pub delivery_bonus_pivot: f64,
    pub delivery_bonus_factor: f64,
    pub price_ratio_steps: Vec<ScoreStep>,
    pub price_ratio_floor: f64,
    pub response_hour_steps: Vec<ScoreStep>,
    pub response_floor: f64,
    pub review_saturation_count: f64,
    pub review_min_count: u64,
    pub review_small_sample_penalty: f64,
    pub max_rating: f64,
    pub compliance_base: f64,
    pub government_approval_bonus: f64,
    pub certification_bonuses: Vec<CertificationBonus>,
    /// Highest `min_score` first; the last band catches everything below.
    pub bands: Vec<ScoreBand>,
}

impl Default for VendorScoringConfig {
    fn default() -> Self {
        let steps = |table: &[(f64, f64)]| -> Vec<ScoreStep> {
            table
                .iter()
                .map(|&(up_to, score)| ScoreStep { up_to, score })
                .collect()
        };
        Self {
            weights: ScoreWeights::default(),
            default_delivery_score: DEFAULT_DELIVERY_SCORE,
            default_price_score: DEFAULT_PRICE_SCORE,
            default_review_score: DEFAULT_REVIEW_SCORE,
            default_fulfillment_score: DEFAULT_FULFILLMENT_SCORE,
            delivery_bonus_pivot: DELIVERY_BONUS_PIVOT,
            delivery_bonus_factor: DELIVERY_BONUS_FACTOR,
            price_ratio_steps: steps(&PRICE_RATIO_STEPS),
            price_ratio_floor: PRICE_RATIO_FLOOR_SCORE,
            response_hour_steps: steps(&RESPONSE_HOUR_STEPS),
            response_floor: RESPONSE_FLOOR_SCORE,
            review_saturation_count: REVIEW_SATURATION_COUNT,
            review_min_count: REVIEW_MIN_COUNT,
            review_small_sample_penalty: REVIEW_SMALL_SAMPLE_PENALTY,
            max_rating: MAX_RATING,
            compliance_base: COMPLIANCE_BASE_SCORE,
            government_approval_bonus: GOVERNMENT_APPROVAL_BONUS,
            certification_bonuses: CERTIFICATION_BONUSES
                .iter()
                .map(|&(label, bonus)| CertificationBonus {
                    label: label.to_string(),
                    bonus,
                })
                .collect(),
            bands: vec![
                ScoreBand {
                    min_score: LOW_RISK_MIN_SCORE,
                    risk_level: RiskLevel::Low,
                    recommendation: Recommendation::HighlyRecommended,
                },
                ScoreBand {
                    min_score: MEDIUM_RISK_MIN_SCORE,
                    risk_level: RiskLevel::Medium,
                    recommendation: Recommendation::Recommended,
                },
                ScoreBand {
                    min_score: HIGH_RISK_MIN_SCORE,
                    risk_level: RiskLevel::High,
                    recommendation: Recommendation::Conditional,
                },
                ScoreBand {
                    min_score: 0.0,
                    risk_level: RiskLevel::VeryHigh,
                    recommendation: Recommendation::NotRecommended,
                },
            ],
        }
    }
}

impl VendorScoringConfig {
    /// Risk level and recommendation for an overall score.
    ///
    /// Falls through to the last band, so every score maps somewhere.
    pub fn band_for(&self, overall_score: f64) -> (RiskLevel, Recommendation) {
        self.bands
            .iter()
            .find(|band| overall_score >= band.min_score)
            .or_else(|| self.bands.last())
            .map(|band| (band.risk_level, band.recommendation))
            .unwrap_or((RiskLevel::VeryHigh, Recommendation::NotRecommended))
    }

    pub fn validate(&self) -> EngineResult<()> {
        let total = self.weights.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::InvalidConfig(format!(
                "vendor.weights sum to {}, expected 1.0",
                total
            )));
        }
        if self.bands.is_empty() {
            return Err(EngineError::InvalidConfig(
                "vendor.bands must not be empty".into(),
            ));
        }
        if self
            .bands
            .windows(2)
            .any(|pair| pair[0].min_score < pair[1].min_score)
        {
            return Err(EngineError::InvalidConfig(
                "vendor.bands must be ordered by descending min_score".into(),
            ));
        }
        if !(self.max_rating > 0.0) || !(self.review_saturation_count > 0.0) {
            return Err(EngineError::InvalidConfig(
                "vendor.max_rating and vendor.review_saturation_count must be > 0".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub anomaly: AnomalyConfig,
    pub vendor: VendorScoringConfig,
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.anomaly.validate()?;
        self.vendor.validate()
    }
}
