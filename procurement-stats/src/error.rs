//! Statistics error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("Need at least {needed} samples, got {got}")]
    InsufficientSamples { needed: usize, got: usize },

    #[error("Cannot scale: standard deviation is {0}")]
    DegenerateScale(f64),

    #[error("Non-finite value at index {0}")]
    NonFinite(usize),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for statistics operations.
pub type StatsResult<T> = Result<T, StatsError>;
