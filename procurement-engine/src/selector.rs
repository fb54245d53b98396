use std::cmp::Ordering;

use crate::types::AnalyzedProduct;
use crate::util;

/// Selectors sort and truncate the candidate list after filtering.
pub trait Selector<C>: Send + Sync {
    fn select(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = self.sort(candidates);
        if let Some(limit) = self.size() {
            sorted.truncate(limit);
        }
        sorted
    }

    /// Extract the score from a candidate to use for sorting.
    fn score(&self, candidate: &C) -> f64;

    /// Sort candidates by score, descending. NaN scores go last.
    ///
    /// The sort is stable, so ties keep their input order.
    fn sort(&self, candidates: Vec<C>) -> Vec<C> {
        let mut sorted = candidates;
        sorted.sort_by(|a, b| {
            let sa = self.score(a);
            let sb = self.score(b);
            match (sa.is_nan(), sb.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => sb.partial_cmp(&sa).unwrap_or(Ordering::Equal),
            }
        });
        sorted
    }

    /// Maximum number of candidates to keep. `None` keeps all.
    fn size(&self) -> Option<usize> {
        None
    }

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

/// Orders flagged products by verdict confidence.
pub struct ConfidenceSelector {
    pub top_k: Option<usize>,
}

impl ConfidenceSelector {
    pub fn new(top_k: Option<usize>) -> Self {
        Self { top_k }
    }
}

impl Selector<AnalyzedProduct> for ConfidenceSelector {
    fn score(&self, candidate: &AnalyzedProduct) -> f64 {
        candidate.anomaly_details.confidence
    }

    fn size(&self) -> Option<usize> {
        self.top_k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain(Option<usize>);

    impl Selector<f64> for Plain {
        fn score(&self, candidate: &f64) -> f64 {
            *candidate
        }

        fn size(&self) -> Option<usize> {
            self.0
        }
    }

    #[test]
    fn nan_sorts_last() {
        let sorted = Plain(None).select(vec![0.2, f64::NAN, 0.9, 0.5]);
        assert_eq!(&sorted[..3], &[0.9, 0.5, 0.2]);
        assert!(sorted[3].is_nan());
    }

    #[test]
    fn truncates_to_size() {
        assert_eq!(Plain(Some(2)).select(vec![0.1, 0.3, 0.2]), vec![0.3, 0.2]);
        assert!(Plain(Some(0)).select(vec![0.1]).is_empty());
    }

    #[test]
    fn selector_name() {
        assert_eq!(ConfidenceSelector::new(None).name(), "ConfidenceSelector");
    }
}
