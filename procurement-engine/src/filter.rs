use crate::types::AnalyzedProduct;
use crate::util;

/// Result of a filter operation, partitioning candidates into kept and removed.
pub struct FilterResult<C> {
    pub kept: Vec<C>,
    pub removed: Vec<C>,
}

/// Filters partition candidates into kept and removed sets.
pub trait Filter<C>: Send + Sync {
    fn filter(&self, candidates: Vec<C>) -> FilterResult<C>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

/// Keeps products whose verdict flagged an anomaly.
pub struct AnomalyFlagFilter;

impl Filter<AnalyzedProduct> for AnomalyFlagFilter {
    fn filter(&self, candidates: Vec<AnalyzedProduct>) -> FilterResult<AnalyzedProduct> {
        let (kept, removed): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| c.anomaly_details.is_anomaly);

        FilterResult { kept, removed }
    }
}
