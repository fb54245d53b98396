use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// Procurement risk tier shared by price verdicts and vendor scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Unknown,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Unknown => write!(f, "Unknown"),
            RiskLevel::Low => write!(f, "Low Risk"),
            RiskLevel::Medium => write!(f, "Medium Risk"),
            RiskLevel::High => write!(f, "High Risk"),
            RiskLevel::VeryHigh => write!(f, "Very High Risk"),
        }
    }
}

// ---------------------------------------------------------------------------
// Price anomaly types
// ---------------------------------------------------------------------------

fn default_category() -> String {
    "General".to_string()
}

/// A quoted price together with the comparable history it is judged against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub current_price: f64,
    #[serde(default)]
    pub historical_prices: Vec<f64>,
    #[serde(default = "default_category", alias = "category")]
    pub item_category: String,
    /// Carried through for context; not used in scoring.
    #[serde(default)]
    pub specifications: Map<String, Value>,
}

impl PriceObservation {
    pub fn new(current_price: f64, historical_prices: Vec<f64>) -> Self {
        Self {
            item_id: None,
            current_price,
            historical_prices,
            item_category: default_category(),
            specifications: Map::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.item_category = category.into();
        self
    }
}

/// Why a price was judged the way it was. Checked in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyReason {
    InsufficientData,
    SignificantlyHigher,
    AboveNormalRange,
    SignificantlyLower,
    BelowNormalRange,
    OutsideQuartileRange,
    MultipleIndicators,
}

impl fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AnomalyReason::InsufficientData => {
                "Insufficient historical data for reliable anomaly detection"
            }
            AnomalyReason::SignificantlyHigher => {
                "Price is significantly higher than typical market rates - potential overpricing or premium product"
            }
            AnomalyReason::AboveNormalRange => {
                "Price is above normal range - may indicate inflation or special specifications"
            }
            AnomalyReason::SignificantlyLower => {
                "Price is significantly lower than market rates - possible clearance, defective, or fraudulent listing"
            }
            AnomalyReason::BelowNormalRange => {
                "Price is below normal range - may indicate discount or promotional pricing"
            }
            AnomalyReason::OutsideQuartileRange => {
                "Price falls outside the typical price quartile range for this product category"
            }
            AnomalyReason::MultipleIndicators => {
                "Multiple statistical indicators suggest this price is unusual for government procurement"
            }
        };
        f.write_str(text)
    }
}

/// Per-method flags that feed the anomaly vote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionMethods {
    pub z_score_flagged: bool,
    pub iqr_flagged: bool,
    pub extreme_deviation: bool,
    pub ml_flagged: bool,
}

impl DetectionMethods {
    /// Number of methods that flagged the price.
    pub fn vote_count(&self) -> u32 {
        [
            self.z_score_flagged,
            self.iqr_flagged,
            self.extreme_deviation,
            self.ml_flagged,
        ]
        .iter()
        .filter(|&&flag| flag)
        .count() as u32
    }
}

/// IQR fence around the historical prices.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// The engine's decision for one observation.
///
/// The statistical fields are `None` when the history was too short to
/// compute them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnomalyVerdict {
    pub is_anomaly: bool,
    pub confidence: f64,
    pub reason: AnomalyReason,
    /// Historical mean (or the current price when history is insufficient).
    pub benchmark_price: f64,
    pub median_price: Option<f64>,
    pub price_deviation_pct: f64,
    pub z_score: Option<f64>,
    pub risk_level: RiskLevel,
    pub risk_note: String,
    pub detection_methods: Option<DetectionMethods>,
    pub price_bounds: Option<PriceBounds>,
    pub analysis_timestamp: String,
}

impl AnomalyVerdict {
    /// Fixed low-confidence verdict for histories too short to analyze.
    pub fn insufficient_data(current_price: f64, confidence: f64, timestamp: String) -> Self {
        Self {
            is_anomaly: false,
            confidence,
            reason: AnomalyReason::InsufficientData,
            benchmark_price: current_price,
            median_price: None,
            price_deviation_pct: 0.0,
            z_score: None,
            risk_level: RiskLevel::Unknown,
            risk_note: String::new(),
            detection_methods: None,
            price_bounds: None,
            analysis_timestamp: timestamp,
        }
    }
}

/// One product of a batch together with its verdict.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalyzedProduct {
    pub product: PriceObservation,
    pub anomaly_details: AnomalyVerdict,
}

/// Outcome of a batch run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchReport {
    pub total_products_analyzed: usize,
    pub anomalies_detected: usize,
    /// Percentage of analyzed products that were flagged.
    pub anomaly_rate: f64,
    /// Flagged products, highest confidence first.
    pub anomalous_products: Vec<AnalyzedProduct>,
}

// ---------------------------------------------------------------------------
// Vendor types
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

fn default_rating() -> f64 {
    4.0
}

fn default_total_orders() -> u64 {
    1
}

fn default_response_hours() -> f64 {
    24.0
}

/// A single past delivery. Records without an `on_time` flag count as on time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    #[serde(default = "default_true")]
    pub on_time: bool,
}

/// Vendor performance metrics. Every field is optional on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VendorProfile {
    #[serde(default)]
    pub delivery_history: Vec<DeliveryRecord>,
    #[serde(default)]
    pub avg_price: f64,
    #[serde(default)]
    pub market_avg_price: f64,
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u64,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub government_approved: bool,
    #[serde(default)]
    pub completed_orders: u64,
    #[serde(default = "default_total_orders")]
    pub total_orders: u64,
    #[serde(default = "default_response_hours")]
    pub avg_response_hours: f64,
}

impl Default for VendorProfile {
    fn default() -> Self {
        Self {
            delivery_history: Vec::new(),
            avg_price: 0.0,
            market_avg_price: 0.0,
            rating: default_rating(),
            review_count: 0,
            certifications: Vec::new(),
            government_approved: false,
            completed_orders: 0,
            total_orders: default_total_orders(),
            avg_response_hours: default_response_hours(),
        }
    }
}

/// The six weighted dimensions of vendor reliability, each in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub delivery_performance: f64,
    pub price_competitiveness: f64,
    pub government_reviews: f64,
    pub compliance: f64,
    pub order_fulfillment: f64,
    pub response_time: f64,
}

impl ScoreBreakdown {
    /// Every dimension at the same value.
    pub fn uniform(value: f64) -> Self {
        Self {
            delivery_performance: value,
            price_competitiveness: value,
            government_reviews: value,
            compliance: value,
            order_fulfillment: value,
            response_time: value,
        }
    }
}

/// Procurement recommendation tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    HighlyRecommended,
    Recommended,
    Conditional,
    NotRecommended,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Recommendation::HighlyRecommended => {
                "Highly Recommended - Preferred vendor for government procurement"
            }
            Recommendation::Recommended => {
                "Recommended - Suitable for government contracts with standard oversight"
            }
            Recommendation::Conditional => {
                "Conditional - Requires additional verification and monitoring"
            }
            Recommendation::NotRecommended => "Not Recommended - Significant risks identified",
        };
        f.write_str(text)
    }
}

/// Composite vendor score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VendorScoreResult {
    pub overall_score: f64,
    pub breakdown: ScoreBreakdown,
    pub risk_level: RiskLevel,
    pub recommendation: Recommendation,
}
