//! Scoring operations: the complete vocabulary of valid requests.
//!
//! A request parses into exactly one of these variants or is rejected.
//! The enum is exhaustive, so the compiler guarantees every operation has a
//! handler in the protocol module.

use std::fmt;
use std::str::FromStr;

use procurement_engine::{PriceObservation, VendorProfile};
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "params")]
pub enum ScoringOperation {
    /// Judge one quoted price against its history.
    DetectAnomaly { observation: PriceObservation },

    /// Judge many quoted prices and report the flagged ones.
    DetectBatch {
        products: Vec<PriceObservation>,
        #[serde(default)]
        top_k: Option<usize>,
    },

    /// Score a vendor's reliability.
    ScoreVendor { profile: VendorProfile },

    /// Report component availability and active thresholds.
    Status,
}

/// Bare payload shape for batch requests: `{"products": [...], "top_k": n}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchPayload {
    pub products: Vec<PriceObservation>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Which operation a bare payload is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Anomaly,
    Batch,
    Vendor,
    Status,
}

impl OperationKind {
    /// Kind named by an envelope's `op` tag.
    pub fn from_op_tag(tag: &str) -> Option<Self> {
        match tag {
            "DetectAnomaly" => Some(OperationKind::Anomaly),
            "DetectBatch" => Some(OperationKind::Batch),
            "ScoreVendor" => Some(OperationKind::Vendor),
            "Status" => Some(OperationKind::Status),
            _ => None,
        }
    }
}

impl FromStr for OperationKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anomaly" => Ok(OperationKind::Anomaly),
            "batch" => Ok(OperationKind::Batch),
            "vendor" => Ok(OperationKind::Vendor),
            "status" => Ok(OperationKind::Status),
            other => Err(BridgeError::UnknownOperation(other.to_string())),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Anomaly => "anomaly",
            OperationKind::Batch => "batch",
            OperationKind::Vendor => "vendor",
            OperationKind::Status => "status",
        };
        f.write_str(name)
    }
}

impl ScoringOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            ScoringOperation::DetectAnomaly { .. } => OperationKind::Anomaly,
            ScoringOperation::DetectBatch { .. } => OperationKind::Batch,
            ScoringOperation::ScoreVendor { .. } => OperationKind::Vendor,
            ScoringOperation::Status => OperationKind::Status,
        }
    }

    /// Parse a bare payload for the given kind.
    pub fn from_payload(kind: OperationKind, raw: &str) -> Result<Self, BridgeError> {
        let op = match kind {
            OperationKind::Anomaly => ScoringOperation::DetectAnomaly {
                observation: serde_json::from_str(raw)?,
            },
            OperationKind::Batch => {
                let BatchPayload { products, top_k } = serde_json::from_str(raw)?;
                ScoringOperation::DetectBatch { products, top_k }
            }
            OperationKind::Vendor => ScoringOperation::ScoreVendor {
                profile: serde_json::from_str(raw)?,
            },
            OperationKind::Status => ScoringOperation::Status,
        };
        Ok(op)
    }

    /// Human-readable description of what this operation does.
    pub fn describe(&self) -> String {
        match self {
            ScoringOperation::DetectAnomaly { observation } => format!(
                "Detect anomaly for {} at {:.2} against {} prices",
                observation
                    .item_id
                    .as_deref()
                    .unwrap_or(&observation.item_category),
                observation.current_price,
                observation.historical_prices.len()
            ),
            ScoringOperation::DetectBatch { products, top_k } => match top_k {
                Some(k) => format!("Detect anomalies in {} products (top {k})", products.len()),
                None => format!("Detect anomalies in {} products", products.len()),
            },
            ScoringOperation::ScoreVendor { profile } => format!(
                "Score vendor with {} deliveries and {} reviews",
                profile.delivery_history.len(),
                profile.review_count
            ),
            ScoringOperation::Status => "Report component status".into(),
        }
    }
}
