pub mod anomaly_detector;
pub mod batch;
pub mod config;
pub mod error;
pub mod filter;
pub mod outlier;
pub mod price_history_loader;
pub mod selector;
pub mod types;
pub mod util;
pub mod vendor_scorer;

pub use anomaly_detector::PriceAnomalyEngine;
pub use config::{AnomalyConfig, EngineConfig, OutlierConfig, VendorScoringConfig};
pub use error::{EngineError, EngineResult};
pub use outlier::{IsolationForestDetector, OutlierDetector};
pub use types::*;
pub use vendor_scorer::VendorReliabilityScorer;
