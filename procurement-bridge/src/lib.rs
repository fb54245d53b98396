//! Procurement Bridge: the validated boundary in front of the scoring engine.
//!
//! Callers send JSON. The bridge parses it into exactly one of the
//! `ScoringOperation` variants, validates the parameters, runs the engine,
//! and renders a rounded wire document:
//! - every operation is an enum variant with validated parameters
//! - every response is a structured type, not free-form text
//! - invalid requests become the operation's fallback document, never a panic

pub mod error;
pub mod ops;
pub mod protocol;
pub mod response;

pub use error::{BridgeError, BridgeResult};
pub use ops::{OperationKind, ScoringOperation};
pub use protocol::{Bridge, BridgeRequest, BridgeResponse};
pub use response::{
    AnomalyResponse, BatchResponse, ResponseDocument, StatusResponse, VendorResponse,
};
