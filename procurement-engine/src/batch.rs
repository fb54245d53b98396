//! Batch anomaly detection.
//!
//! Products are analyzed in parallel, then the flagged ones are partitioned
//! out by `AnomalyFlagFilter` and ranked by `ConfidenceSelector`.

use rayon::prelude::*;

use crate::anomaly_detector::PriceAnomalyEngine;
use crate::filter::{AnomalyFlagFilter, Filter, FilterResult};
use crate::selector::{ConfidenceSelector, Selector};
use crate::types::{AnalyzedProduct, BatchReport, PriceObservation};

impl PriceAnomalyEngine {
    /// Analyze every product and report the flagged ones, highest confidence
    /// first. `top_k` limits the list but not `anomalies_detected`.
    pub fn detect_batch(&self, products: Vec<PriceObservation>, top_k: Option<usize>) -> BatchReport {
        let total = products.len();

        let analyzed: Vec<AnalyzedProduct> = products
            .into_par_iter()
            .map(|product| {
                let anomaly_details = self.detect(&product);
                AnalyzedProduct {
                    product,
                    anomaly_details,
                }
            })
            .collect();

        let filter = AnomalyFlagFilter;
        let FilterResult { kept, removed } = filter.filter(analyzed);
        log::debug!(
            "{}: kept {}, removed {}",
            filter.name(),
            kept.len(),
            removed.len()
        );

        let anomalies_detected = kept.len();
        let anomalous_products = ConfidenceSelector::new(top_k).select(kept);
        let anomaly_rate = if total == 0 {
            0.0
        } else {
            anomalies_detected as f64 / total as f64 * 100.0
        };

        log::info!(
            "Batch analyzed {} products, {} anomalous ({:.1}%)",
            total,
            anomalies_detected,
            anomaly_rate
        );

        BatchReport {
            total_products_analyzed: total,
            anomalies_detected,
            anomaly_rate,
            anomalous_products,
        }
    }
}
