//! Bridge error types.
//!
//! Every failure mode has a named variant. None of them escape `Bridge::handle`;
//! they are rendered into the fallback document's `error` field.

use procurement_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid parameter for {op}: {reason}")]
    InvalidParameter { op: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Load error: {0}")]
    Load(#[from] EngineError),
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
