//! Centralized default thresholds for procurement price and vendor scoring.
//!
//! These values are calibrated for government procurement of catalogue goods.
//! They are the defaults behind `AnomalyConfig` and `VendorScoringConfig` in
//! `procurement-engine`; the engine never reads them directly inside an
//! algorithm, so a config file can override any of them.

// ---------------------------------------------------------------------------
// Price anomaly detection
// ---------------------------------------------------------------------------

/// Minimum number of historical prices before any statistics are attempted.
pub const MIN_HISTORY_POINTS: usize = 5;

/// Confidence reported for the insufficient-history verdict.
pub const INSUFFICIENT_DATA_CONFIDENCE: f64 = 0.3;

/// Absolute z-score above which a price is flagged.
pub const Z_SCORE_THRESHOLD: f64 = 2.5;

/// Tukey fence multiplier applied to the interquartile range.
pub const IQR_FENCE_MULTIPLIER: f64 = 1.5;

/// Relative deviation from the median above which a price is "extreme".
pub const EXTREME_DEVIATION_RATIO: f64 = 0.5;

/// Width of the band (in standard deviations) used to pick the reason text.
pub const REASON_SIGMA_BAND: f64 = 2.0;

/// Number of agreeing signals required to call a price anomalous.
pub const ANOMALY_VOTE_THRESHOLD: u32 = 2;

/// Total number of voting signals (three statistical + one ML).
pub const ANOMALY_SIGNAL_COUNT: u32 = 4;

/// Share of confidence driven by method agreement.
pub const AGREEMENT_WEIGHT: f64 = 0.8;

/// Share of confidence driven by z-score magnitude.
pub const Z_MAGNITUDE_WEIGHT: f64 = 0.2;

/// z-score that saturates the magnitude share of confidence.
pub const Z_MAGNITUDE_SCALE: f64 = 5.0;

/// Below this confidence the risk is always Low (not enough evidence).
pub const LOW_CONFIDENCE_CUTOFF: f64 = 0.3;

// Risk ladder rungs: minimum confidence, and the price ratio (current /
// historical mean) that must be exceeded above or undercut below.

pub const VERY_HIGH_RISK_MIN_CONFIDENCE: f64 = 0.8;
pub const VERY_HIGH_RISK_RATIO_ABOVE: f64 = 1.5;
pub const VERY_HIGH_RISK_RATIO_BELOW: f64 = 0.5;

pub const HIGH_RISK_MIN_CONFIDENCE: f64 = 0.6;
pub const HIGH_RISK_RATIO_ABOVE: f64 = 1.3;
pub const HIGH_RISK_RATIO_BELOW: f64 = 0.7;

pub const MEDIUM_RISK_MIN_CONFIDENCE: f64 = 0.4;
pub const MEDIUM_RISK_RATIO_ABOVE: f64 = 1.2;
pub const MEDIUM_RISK_RATIO_BELOW: f64 = 0.8;

// ---------------------------------------------------------------------------
// Isolation forest
// ---------------------------------------------------------------------------

/// Trees in the isolation forest ensemble.
pub const FOREST_TREES: usize = 100;

/// Upper bound on the sub-sample drawn for each tree.
pub const FOREST_MAX_SAMPLES: usize = 256;

/// Expected share of anomalies in the training data.
pub const FOREST_CONTAMINATION: f64 = 0.1;

/// Seed for reproducible forests.
pub const FOREST_SEED: u64 = 42;

// ---------------------------------------------------------------------------
// Vendor reliability
// ---------------------------------------------------------------------------

pub const WEIGHT_DELIVERY: f64 = 0.25;
pub const WEIGHT_PRICE: f64 = 0.20;
pub const WEIGHT_REVIEWS: f64 = 0.20;
pub const WEIGHT_COMPLIANCE: f64 = 0.15;
pub const WEIGHT_FULFILLMENT: f64 = 0.10;
pub const WEIGHT_RESPONSE: f64 = 0.10;

/// Neutral score for vendors without delivery history.
pub const DEFAULT_DELIVERY_SCORE: f64 = 70.0;

/// Neutral score when no market price is known.
pub const DEFAULT_PRICE_SCORE: f64 = 75.0;

/// Neutral score for vendors without reviews.
pub const DEFAULT_REVIEW_SCORE: f64 = 70.0;

/// Neutral score for vendors without orders.
pub const DEFAULT_FULFILLMENT_SCORE: f64 = 70.0;

/// On-time rate above which the delivery bonus applies.
pub const DELIVERY_BONUS_PIVOT: f64 = 0.8;

/// Bonus points per unit of on-time rate above the pivot.
pub const DELIVERY_BONUS_FACTOR: f64 = 50.0;

/// Review count at which ratings are fully trusted.
pub const REVIEW_SATURATION_COUNT: f64 = 50.0;

/// Review count below which the small-sample penalty applies.
pub const REVIEW_MIN_COUNT: u64 = 10;

/// Multiplier applied to review confidence for small samples.
pub const REVIEW_SMALL_SAMPLE_PENALTY: f64 = 0.8;

/// Maximum vendor rating (five-star scale).
pub const MAX_RATING: f64 = 5.0;

pub const COMPLIANCE_BASE_SCORE: f64 = 50.0;
pub const GOVERNMENT_APPROVAL_BONUS: f64 = 30.0;

/// Certification bonuses, matched case-insensitively as substrings.
/// Order matters: the first matching entry wins for a certification.
pub const CERTIFICATION_BONUSES: [(&str, f64); 5] = [
    ("ISO", 10.0),
    ("BIS", 15.0),
    ("GeM", 20.0),
    ("Quality", 5.0),
    ("Environmental", 5.0),
];

/// `(max price ratio, score)` steps for price competitiveness.
pub const PRICE_RATIO_STEPS: [(f64, f64); 4] = [(0.9, 100.0), (1.0, 90.0), (1.1, 75.0), (1.2, 60.0)];

/// Score when the vendor is more than 20% above market.
pub const PRICE_RATIO_FLOOR_SCORE: f64 = 40.0;

/// `(max hours, score)` steps for response time.
pub const RESPONSE_HOUR_STEPS: [(f64, f64); 4] = [(2.0, 100.0), (8.0, 90.0), (24.0, 75.0), (48.0, 60.0)];

/// Score for responses slower than two days.
pub const RESPONSE_FLOOR_SCORE: f64 = 40.0;

/// Overall score thresholds for Low / Medium / High risk (else Very High).
pub const LOW_RISK_MIN_SCORE: f64 = 85.0;
pub const MEDIUM_RISK_MIN_SCORE: f64 = 70.0;
pub const HIGH_RISK_MIN_SCORE: f64 = 55.0;
