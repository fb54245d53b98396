//! Wire documents.
//!
//! The core keeps full precision; rounding happens only here, when a result
//! is rendered for the caller. Every document carries an optional `error`,
//! set only on the fallback path.

use procurement_engine::config::ScoreWeights;
use procurement_engine::{
    AnalyzedProduct, AnomalyConfig, AnomalyVerdict, BatchReport, DetectionMethods,
    PriceObservation, PriceBounds, RiskLevel, ScoreBreakdown, VendorScoreResult,
};
use serde::Serialize;

/// Round half away from zero to `dp` decimal places.
pub fn round_to(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

/// "Very High Risk - Strong indication of pricing anomaly" style label.
pub fn risk_label(level: RiskLevel, note: &str) -> String {
    if level == RiskLevel::Unknown || note.is_empty() {
        level.to_string()
    } else {
        format!("{} - {}", level, note)
    }
}

// ---------------------------------------------------------------------------
// Anomaly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyResponse {
    pub is_anomaly: bool,
    pub confidence: f64,
    pub reason: String,
    pub benchmark_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_price: Option<f64>,
    pub price_deviation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    pub risk_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_methods: Option<DetectionMethods>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_bounds: Option<PriceBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&AnomalyVerdict> for AnomalyResponse {
    fn from(verdict: &AnomalyVerdict) -> Self {
        Self {
            is_anomaly: verdict.is_anomaly,
            confidence: round_to(verdict.confidence, 2),
            reason: verdict.reason.to_string(),
            benchmark_price: round_to(verdict.benchmark_price, 2),
            median_price: verdict.median_price.map(|m| round_to(m, 2)),
            price_deviation: round_to(verdict.price_deviation_pct, 1),
            z_score: verdict.z_score.map(|z| round_to(z, 2)),
            risk_level: risk_label(verdict.risk_level, &verdict.risk_note),
            detection_methods: verdict.detection_methods,
            price_bounds: verdict.price_bounds.map(|b| PriceBounds {
                lower_bound: round_to(b.lower_bound, 2),
                upper_bound: round_to(b.upper_bound, 2),
            }),
            analysis_timestamp: Some(verdict.analysis_timestamp.clone()),
            error: None,
        }
    }
}

impl AnomalyResponse {
    pub fn fallback(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            is_anomaly: false,
            confidence: 0.0,
            reason: format!("Error in anomaly detection: {}", error),
            benchmark_price: 0.0,
            median_price: None,
            price_deviation: 0.0,
            z_score: None,
            risk_level: RiskLevel::Unknown.to_string(),
            detection_methods: None,
            price_bounds: None,
            analysis_timestamp: None,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedProductResponse {
    pub product: PriceObservation,
    pub anomaly_details: AnomalyResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResponse {
    pub total_products_analyzed: usize,
    pub anomalies_detected: usize,
    pub anomaly_rate: f64,
    pub anomalous_products: Vec<FlaggedProductResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&BatchReport> for BatchResponse {
    fn from(report: &BatchReport) -> Self {
        Self {
            total_products_analyzed: report.total_products_analyzed,
            anomalies_detected: report.anomalies_detected,
            anomaly_rate: round_to(report.anomaly_rate, 1),
            anomalous_products: report
                .anomalous_products
                .iter()
                .map(|AnalyzedProduct { product, anomaly_details }| FlaggedProductResponse {
                    product: product.clone(),
                    anomaly_details: AnomalyResponse::from(anomaly_details),
                })
                .collect(),
            error: None,
        }
    }
}

impl BatchResponse {
    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            total_products_analyzed: 0,
            anomalies_detected: 0,
            anomaly_rate: 0.0,
            anomalous_products: Vec::new(),
            error: Some(error.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Vendor
// ---------------------------------------------------------------------------

/// Sub-score used for every dimension of the vendor fallback.
const FALLBACK_VENDOR_SCORE: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorResponse {
    pub overall_score: f64,
    pub breakdown: ScoreBreakdown,
    pub risk_level: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&VendorScoreResult> for VendorResponse {
    fn from(result: &VendorScoreResult) -> Self {
        let b = &result.breakdown;
        Self {
            overall_score: round_to(result.overall_score, 1),
            breakdown: ScoreBreakdown {
                delivery_performance: round_to(b.delivery_performance, 1),
                price_competitiveness: round_to(b.price_competitiveness, 1),
                government_reviews: round_to(b.government_reviews, 1),
                compliance: round_to(b.compliance, 1),
                order_fulfillment: round_to(b.order_fulfillment, 1),
                response_time: round_to(b.response_time, 1),
            },
            risk_level: result.risk_level.to_string(),
            recommendation: result.recommendation.to_string(),
            error: None,
        }
    }
}

impl VendorResponse {
    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            overall_score: FALLBACK_VENDOR_SCORE,
            breakdown: ScoreBreakdown::uniform(FALLBACK_VENDOR_SCORE),
            risk_level: RiskLevel::Medium.to_string(),
            recommendation: "Default scoring due to processing error".into(),
            error: Some(error.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentStatus {
    pub anomaly_detector: bool,
    pub vendor_scorer: bool,
}

/// Thresholds currently in force, echoed for operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveThresholds {
    pub min_history: usize,
    pub z_score_threshold: f64,
    pub iqr_multiplier: f64,
    pub extreme_deviation_ratio: f64,
    pub vote_threshold: u32,
    pub vendor_weights: ScoreWeights,
}

impl ActiveThresholds {
    pub fn new(anomaly: &AnomalyConfig, vendor_weights: &ScoreWeights) -> Self {
        Self {
            min_history: anomaly.min_history,
            z_score_threshold: anomaly.z_score_threshold,
            iqr_multiplier: anomaly.iqr_multiplier,
            extreme_deviation_ratio: anomaly.extreme_deviation_ratio,
            vote_threshold: anomaly.vote_threshold,
            vendor_weights: vendor_weights.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub models: ComponentStatus,
    pub all_models_ready: bool,
    pub outlier_method: String,
    pub thresholds: ActiveThresholds,
    pub last_check: String,
    pub system: String,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Error-only document for requests whose operation could not be identified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Any document the bridge can emit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseDocument {
    Anomaly(AnomalyResponse),
    Batch(BatchResponse),
    Vendor(VendorResponse),
    Status(StatusResponse),
    Error(ErrorResponse),
}

impl ResponseDocument {
    /// The fallback error message, if this document is a fallback.
    pub fn error(&self) -> Option<&str> {
        match self {
            ResponseDocument::Anomaly(doc) => doc.error.as_deref(),
            ResponseDocument::Batch(doc) => doc.error.as_deref(),
            ResponseDocument::Vendor(doc) => doc.error.as_deref(),
            ResponseDocument::Status(_) => None,
            ResponseDocument::Error(doc) => Some(&doc.error),
        }
    }
}
