//! Bridge protocol: request parsing, validation, execution and rendering.
//!
//! Every request goes through the same steps:
//! 1. raw JSON -> `ScoringOperation` (reject if it does not parse)
//! 2. validate parameters (reject non-finite or out-of-range values)
//! 3. execute against the engine (never fails)
//! 4. render the rounded wire document
//!
//! A rejection at steps 1-2 produces the fallback document for the operation
//! kind, with the reason in `error`. `handle` and `handle_envelope` therefore
//! always return a document.

use procurement_engine::util::timestamp_now;
use procurement_engine::{
    EngineConfig, PriceAnomalyEngine, PriceObservation, VendorProfile, VendorReliabilityScorer,
};
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};
use crate::ops::{OperationKind, ScoringOperation};
use crate::response::*;

const SYSTEM_NAME: &str = "Government Procurement Price Benchmarking";

/// A tagged request: `{"operation": {"op": ..., "params": ...}, "request_id": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub operation: ScoringOperation,

    /// Request ID for tracking.
    #[serde(default)]
    pub request_id: String,

    /// Optional caller context, logged only.
    #[serde(default)]
    pub context: Option<String>,
}

/// Response to a tagged request.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeResponse {
    /// Request ID (echoed back).
    pub request_id: String,
    pub operation: String,
    pub result: ResponseDocument,
}

/// The boundary between callers and the scoring engine.
pub struct Bridge {
    anomaly: PriceAnomalyEngine,
    vendor: VendorReliabilityScorer,
    config: EngineConfig,
}

impl Bridge {
    /// Build a bridge from a validated config.
    pub fn new(config: EngineConfig) -> BridgeResult<Self> {
        config.validate().map_err(|e| BridgeError::InvalidConfig(e.to_string()))?;
        Ok(Self {
            anomaly: PriceAnomalyEngine::new(config.anomaly.clone()),
            vendor: VendorReliabilityScorer::new(config.vendor.clone()),
            config,
        })
    }

    /// Build a bridge around an existing engine, e.g. one with a custom detector.
    pub fn with_engine(anomaly: PriceAnomalyEngine, vendor: VendorReliabilityScorer) -> Self {
        let config = EngineConfig {
            anomaly: anomaly.config().clone(),
            vendor: vendor.config().clone(),
        };
        Self {
            anomaly,
            vendor,
            config,
        }
    }

    /// Parse a tagged request and validate its parameters.
    pub fn parse_request(&self, raw_json: &str) -> BridgeResult<BridgeRequest> {
        let request: BridgeRequest = serde_json::from_str(raw_json).map_err(|e| {
            BridgeError::UnknownOperation(format!("Failed to parse request: {}", e))
        })?;
        self.validate_operation(&request.operation)?;
        Ok(request)
    }

    /// Parse a bare payload for `kind` and validate its parameters.
    pub fn parse_payload(&self, kind: OperationKind, raw_json: &str) -> BridgeResult<ScoringOperation> {
        let op = ScoringOperation::from_payload(kind, raw_json)?;
        self.validate_operation(&op)?;
        Ok(op)
    }

    /// Validate operation parameters.
    pub fn validate_operation(&self, op: &ScoringOperation) -> BridgeResult<()> {
        match op {
            ScoringOperation::DetectAnomaly { observation } => {
                validate_observation("DetectAnomaly", observation)
            }
            ScoringOperation::DetectBatch { products, .. } => products
                .iter()
                .try_for_each(|p| validate_observation("DetectBatch", p)),
            ScoringOperation::ScoreVendor { profile } => {
                validate_profile(profile, self.config.vendor.max_rating)
            }
            ScoringOperation::Status => Ok(()),
        }
    }

    /// Run a validated operation.
    pub fn execute(&self, op: &ScoringOperation) -> ResponseDocument {
        log::debug!("Executing: {}", op.describe());
        match op {
            ScoringOperation::DetectAnomaly { observation } => {
                let verdict = self.anomaly.detect(observation);
                ResponseDocument::Anomaly(AnomalyResponse::from(&verdict))
            }
            ScoringOperation::DetectBatch { products, top_k } => {
                let report = self.anomaly.detect_batch(products.clone(), *top_k);
                ResponseDocument::Batch(BatchResponse::from(&report))
            }
            ScoringOperation::ScoreVendor { profile } => {
                let result = self.vendor.score(profile);
                ResponseDocument::Vendor(VendorResponse::from(&result))
            }
            ScoringOperation::Status => ResponseDocument::Status(self.status()),
        }
    }

    /// Handle a bare payload. Always returns a document.
    pub fn handle(&self, kind: OperationKind, raw_json: &str) -> ResponseDocument {
        match self.parse_payload(kind, raw_json) {
            Ok(op) => self.execute(&op),
            Err(e) => {
                log::warn!("Rejected {} request: {}", kind, e);
                fallback(kind, &e)
            }
        }
    }

    /// Handle a tagged request. Always returns a response.
    pub fn handle_envelope(&self, raw_json: &str) -> BridgeResponse {
        match self.parse_request(raw_json) {
            Ok(request) => {
                if let Some(context) = &request.context {
                    log::debug!("Request {} context: {}", request.request_id, context);
                }
                BridgeResponse {
                    operation: request.operation.describe(),
                    result: self.execute(&request.operation),
                    request_id: request.request_id,
                }
            }
            Err(e) => {
                log::warn!("Rejected request: {}", e);
                let (request_id, kind) = salvage_envelope(raw_json);
                let result = match kind {
                    Some(kind) => fallback(kind, &e),
                    None => ResponseDocument::Error(ErrorResponse {
                        error: e.to_string(),
                    }),
                };
                BridgeResponse {
                    request_id,
                    operation: kind.map(|k| k.to_string()).unwrap_or_default(),
                    result,
                }
            }
        }
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            success: true,
            models: ComponentStatus {
                anomaly_detector: true,
                vendor_scorer: true,
            },
            all_models_ready: true,
            outlier_method: self.anomaly.detector_name().to_string(),
            thresholds: ActiveThresholds::new(&self.config.anomaly, &self.config.vendor.weights),
            last_check: timestamp_now(),
            system: SYSTEM_NAME.to_string(),
        }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::with_engine(
            PriceAnomalyEngine::default(),
            VendorReliabilityScorer::default(),
        )
    }
}

/// Fallback document for a rejected request of the given kind.
pub fn fallback(kind: OperationKind, error: &BridgeError) -> ResponseDocument {
    let message = error.to_string();
    match kind {
        OperationKind::Anomaly => ResponseDocument::Anomaly(AnomalyResponse::fallback(message)),
        OperationKind::Batch => ResponseDocument::Batch(BatchResponse::fallback(message)),
        OperationKind::Vendor => ResponseDocument::Vendor(VendorResponse::fallback(message)),
        OperationKind::Status => ResponseDocument::Error(ErrorResponse { error: message }),
    }
}

/// Best-effort recovery of the request id and operation kind from a request
/// that failed to parse or validate.
fn salvage_envelope(raw_json: &str) -> (String, Option<OperationKind>) {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw_json) else {
        return (String::new(), None);
    };
    let request_id = value
        .get("request_id")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let kind = value
        .get("operation")
        .and_then(|op| op.get("op"))
        .and_then(|tag| tag.as_str())
        .and_then(OperationKind::from_op_tag);
    (request_id, kind)
}

fn invalid(op: &str, reason: String) -> BridgeError {
    BridgeError::InvalidParameter {
        op: op.into(),
        reason,
    }
}

fn validate_observation(op: &str, observation: &PriceObservation) -> BridgeResult<()> {
    let current = observation.current_price;
    if !current.is_finite() || current < 0.0 {
        return Err(invalid(
            op,
            format!("current_price={} must be finite and >= 0", current),
        ));
    }
    if let Some((idx, price)) = observation
        .historical_prices
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(invalid(
            op,
            format!("historical_prices[{}]={} must be finite and >= 0", idx, price),
        ));
    }
    Ok(())
}

fn validate_profile(profile: &VendorProfile, max_rating: f64) -> BridgeResult<()> {
    const OP: &str = "ScoreVendor";
    if !(0.0..=max_rating).contains(&profile.rating) {
        return Err(invalid(
            OP,
            format!("rating={} out of range [0, {}]", profile.rating, max_rating),
        ));
    }
    for (name, value) in [
        ("avg_price", profile.avg_price),
        ("market_avg_price", profile.market_avg_price),
        ("avg_response_hours", profile.avg_response_hours),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(OP, format!("{}={} must be finite and >= 0", name, value)));
        }
    }
    Ok(())
}
