//! Vendor reliability scoring.
//!
//! Six sub-scores in `[0, 100]` are combined with the configured weights into
//! an overall score, which the band table maps to a risk level and a
//! procurement recommendation. Missing data never fails: each dimension has
//! a neutral default.

use crate::config::{step_score, VendorScoringConfig};
use crate::types::{DeliveryRecord, ScoreBreakdown, VendorProfile, VendorScoreResult};

/// Clamp a sub-score into `[0, 100]`; NaN scores as zero.
fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[derive(Default)]
pub struct VendorReliabilityScorer {
    config: VendorScoringConfig,
}

impl VendorReliabilityScorer {
    pub fn new(config: VendorScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VendorScoringConfig {
        &self.config
    }

    /// Score a vendor profile. Never fails.
    pub fn score(&self, profile: &VendorProfile) -> VendorScoreResult {
        let breakdown = ScoreBreakdown {
            delivery_performance: clamp_score(self.delivery_score(&profile.delivery_history)),
            price_competitiveness: clamp_score(
                self.price_score(profile.avg_price, profile.market_avg_price),
            ),
            government_reviews: clamp_score(self.review_score(profile.rating, profile.review_count)),
            compliance: clamp_score(
                self.compliance_score(&profile.certifications, profile.government_approved),
            ),
            order_fulfillment: clamp_score(
                self.fulfillment_score(profile.completed_orders, profile.total_orders),
            ),
            response_time: clamp_score(self.response_score(profile.avg_response_hours)),
        };

        let overall_score = clamp_score(self.weighted_total(&breakdown));
        let (risk_level, recommendation) = self.config.band_for(overall_score);
        log::debug!(
            "Vendor scored {:.1} ({}) from {:?}",
            overall_score,
            risk_level,
            breakdown
        );

        VendorScoreResult {
            overall_score,
            breakdown,
            risk_level,
            recommendation,
        }
    }

    pub fn weighted_total(&self, breakdown: &ScoreBreakdown) -> f64 {
        let w = &self.config.weights;
        breakdown.delivery_performance * w.delivery
            + breakdown.price_competitiveness * w.price
            + breakdown.government_reviews * w.reviews
            + breakdown.compliance * w.compliance
            + breakdown.order_fulfillment * w.fulfillment
            + breakdown.response_time * w.response
    }

    /// On-time percentage, with a bonus for rates above the pivot.
    pub fn delivery_score(&self, history: &[DeliveryRecord]) -> f64 {
        if history.is_empty() {
            return self.config.default_delivery_score;
        }
        let on_time = history.iter().filter(|d| d.on_time).count();
        let rate = on_time as f64 / history.len() as f64;
        let mut score = rate * 100.0;
        if rate > self.config.delivery_bonus_pivot {
            score += (rate - self.config.delivery_bonus_pivot) * self.config.delivery_bonus_factor;
        }
        score.min(100.0)
    }

    pub fn price_score(&self, vendor_avg_price: f64, market_avg_price: f64) -> f64 {
        if market_avg_price <= 0.0 {
            return self.config.default_price_score;
        }
        let ratio = vendor_avg_price / market_avg_price;
        step_score(
            &self.config.price_ratio_steps,
            ratio,
            self.config.price_ratio_floor,
        )
    }

    /// Star rating on a 100-point scale, discounted for thin review counts.
    pub fn review_score(&self, rating: f64, review_count: u64) -> f64 {
        if review_count == 0 {
            return self.config.default_review_score;
        }
        let base = rating / self.config.max_rating * 100.0;
        let mut multiplier = (review_count as f64 / self.config.review_saturation_count).min(1.0);
        if review_count < self.config.review_min_count {
            multiplier *= self.config.review_small_sample_penalty;
        }
        base * multiplier
    }

    /// Base plus approval bonus plus at most one bonus per certification.
    pub fn compliance_score(&self, certifications: &[String], government_approved: bool) -> f64 {
        let mut score = self.config.compliance_base;
        if government_approved {
            score += self.config.government_approval_bonus;
        }
        for cert in certifications {
            let cert = cert.to_lowercase();
            if let Some(bonus) = self
                .config
                .certification_bonuses
                .iter()
                .find(|b| cert.contains(&b.label.to_lowercase()))
            {
                score += bonus.bonus;
            }
        }
        score.min(100.0)
    }

    pub fn fulfillment_score(&self, completed_orders: u64, total_orders: u64) -> f64 {
        if total_orders == 0 {
            return self.config.default_fulfillment_score;
        }
        completed_orders as f64 / total_orders as f64 * 100.0
    }

    pub fn response_score(&self, avg_response_hours: f64) -> f64 {
        step_score(
            &self.config.response_hour_steps,
            avg_response_hours,
            self.config.response_floor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Recommendation, RiskLevel};

    fn deliveries(on_time: usize, late: usize) -> Vec<DeliveryRecord> {
        std::iter::repeat(true)
            .take(on_time)
            .chain(std::iter::repeat(false).take(late))
            .map(|on_time| DeliveryRecord { on_time })
            .collect()
    }

    fn strong_vendor() -> VendorProfile {
        VendorProfile {
            delivery_history: deliveries(19, 1),
            avg_price: 950.0,
            market_avg_price: 1000.0,
            rating: 4.6,
            review_count: 80,
            certifications: vec!["ISO 9001".into(), "GeM Registered".into()],
            government_approved: true,
            completed_orders: 98,
            total_orders: 100,
            avg_response_hours: 4.0,
        }
    }

    #[test]
    fn strong_vendor_is_highly_recommended() {
        let result = VendorReliabilityScorer::default().score(&strong_vendor());
        // delivery 95 + 7.5 -> 100, price 90, reviews 92, compliance 100,
        // fulfillment 98, response 90
        let expected = 100.0 * 0.25 + 90.0 * 0.20 + 92.0 * 0.20 + 100.0 * 0.15 + 98.0 * 0.10 + 90.0 * 0.10;
        assert!((result.overall_score - expected).abs() < 1e-9);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.recommendation, Recommendation::HighlyRecommended);
    }

    #[test]
    fn empty_profile_scores_from_defaults() {
        let result = VendorReliabilityScorer::default().score(&VendorProfile::default());
        let b = result.breakdown;
        assert_eq!(b.delivery_performance, 70.0);
        assert_eq!(b.price_competitiveness, 75.0);
        assert_eq!(b.government_reviews, 70.0);
        assert_eq!(b.compliance, 50.0);
        // 0 of 1 orders completed
        assert_eq!(b.order_fulfillment, 0.0);
        assert_eq!(b.response_time, 75.0);
        let expected = 70.0 * 0.25 + 75.0 * 0.20 + 70.0 * 0.20 + 50.0 * 0.15 + 0.0 + 75.0 * 0.10;
        assert!((result.overall_score - expected).abs() < 1e-9);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.recommendation, Recommendation::Conditional);
    }

    #[test]
    fn missing_data_gets_neutral_scores() {
        let scorer = VendorReliabilityScorer::default();
        assert_eq!(scorer.delivery_score(&[]), 70.0);
        assert_eq!(scorer.review_score(4.5, 0), 70.0);
        assert_eq!(scorer.price_score(900.0, 0.0), 75.0);
        assert_eq!(scorer.fulfillment_score(0, 0), 70.0);
    }

    #[test]
    fn explicit_zero_total_orders_is_neutral() {
        let profile: VendorProfile =
            serde_json::from_str(r#"{"total_orders": 0, "completed_orders": 0}"#).unwrap();
        let result = VendorReliabilityScorer::default().score(&profile);
        assert_eq!(result.breakdown.order_fulfillment, 70.0);
        // 70*.25 + 75*.2 + 70*.2 + 50*.15 + 70*.1 + 75*.1
        assert!((result.overall_score - 68.5).abs() < 1e-9);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn delivery_bonus_only_above_pivot() {
        let scorer = VendorReliabilityScorer::default();
        assert_eq!(scorer.delivery_score(&deliveries(8, 2)), 80.0);
        assert!((scorer.delivery_score(&deliveries(9, 1)) - 95.0).abs() < 1e-9);
        assert_eq!(scorer.delivery_score(&deliveries(10, 0)), 100.0);
        assert_eq!(scorer.delivery_score(&[]), 70.0);
    }

    #[test]
    fn price_steps() {
        let scorer = VendorReliabilityScorer::default();
        assert_eq!(scorer.price_score(850.0, 1000.0), 100.0);
        assert_eq!(scorer.price_score(1000.0, 1000.0), 90.0);
        assert_eq!(scorer.price_score(1100.0, 1000.0), 75.0);
        assert_eq!(scorer.price_score(1150.0, 1000.0), 60.0);
        assert_eq!(scorer.price_score(1500.0, 1000.0), 40.0);
        assert_eq!(scorer.price_score(1500.0, 0.0), 75.0);
        assert_eq!(scorer.price_score(1500.0, -3.0), 75.0);
    }

    #[test]
    fn few_reviews_are_discounted() {
        let scorer = VendorReliabilityScorer::default();
        // 5/50 * 0.8 = 0.08
        assert!((scorer.review_score(5.0, 5) - 8.0).abs() < 1e-9);
        // 25/50 = 0.5
        assert!((scorer.review_score(4.0, 25) - 40.0).abs() < 1e-9);
        assert!((scorer.review_score(4.0, 500) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn certification_matching_is_case_insensitive_and_capped() {
        let scorer = VendorReliabilityScorer::default();
        let certs = vec!["bis hallmark".to_string()];
        assert_eq!(scorer.compliance_score(&certs, false), 65.0);

        let many = vec![
            "ISO 9001".to_string(),
            "BIS".to_string(),
            "GeM".to_string(),
        ];
        assert_eq!(scorer.compliance_score(&many, true), 100.0);
    }

    #[test]
    fn one_bonus_per_certification() {
        let scorer = VendorReliabilityScorer::default();
        // Contains both "ISO" and "Quality"; only the first table entry counts.
        let certs = vec!["ISO Quality Management".to_string()];
        assert_eq!(scorer.compliance_score(&certs, false), 60.0);
    }

    #[test]
    fn response_steps() {
        let scorer = VendorReliabilityScorer::default();
        assert_eq!(scorer.response_score(1.0), 100.0);
        assert_eq!(scorer.response_score(8.0), 90.0);
        assert_eq!(scorer.response_score(30.0), 60.0);
        assert_eq!(scorer.response_score(72.0), 40.0);
    }

    #[test]
    fn over_fulfillment_is_clamped() {
        let profile = VendorProfile {
            completed_orders: 150,
            total_orders: 100,
            ..VendorProfile::default()
        };
        let result = VendorReliabilityScorer::default().score(&profile);
        assert_eq!(result.breakdown.order_fulfillment, 100.0);
    }

    #[test]
    fn out_of_range_rating_is_clamped() {
        let profile = VendorProfile {
            rating: 9.0,
            review_count: 100,
            ..VendorProfile::default()
        };
        let result = VendorReliabilityScorer::default().score(&profile);
        assert_eq!(result.breakdown.government_reviews, 100.0);
        assert!(result.overall_score <= 100.0);
    }

    #[test]
    fn poor_vendor_is_not_recommended() {
        let profile = VendorProfile {
            delivery_history: deliveries(3, 7),
            avg_price: 1500.0,
            market_avg_price: 1000.0,
            rating: 2.0,
            review_count: 60,
            certifications: vec![],
            government_approved: false,
            completed_orders: 40,
            total_orders: 100,
            avg_response_hours: 96.0,
        };
        let result = VendorReliabilityScorer::default().score(&profile);
        assert_eq!(result.risk_level, RiskLevel::VeryHigh);
        assert_eq!(result.recommendation, Recommendation::NotRecommended);
    }
}
