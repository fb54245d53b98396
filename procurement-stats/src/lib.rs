pub mod descriptive;
pub mod error;
pub mod isolation_forest;
pub mod scaler;
pub mod thresholds;

pub use descriptive::{mean_std, median, percentile, Summary};
pub use error::{StatsError, StatsResult};
pub use isolation_forest::{IsolationForest, IsolationForestConfig};
pub use scaler::StandardScaler;
