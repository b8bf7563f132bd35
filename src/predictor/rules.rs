//! Rule-based predictor
//!
//! Deterministic, no learned parameters. Slices are carved out of the surplus
//! one after another: emergency fund first, then a share of what remains.

use super::{AllocationBasis, AllocationPredictor, Prediction};
use crate::features::FeatureVector;
use crate::models::{
    AllocationSet, Bucket, BucketConfidence, InvestmentType, PredictorVariant, UserProfile,
};
use crate::Result;
use tracing::debug;

pub const DEFAULT_EMERGENCY_MULTIPLIER: f64 = 0.35;

/// Months of expenses the emergency fund may cover at most
const EMERGENCY_EXPENSE_MONTHS: f64 = 3.0;
const MIN_EMERGENCY_AMOUNT: f64 = 500.0;

/// Income stability at or below this counts as irregular income
const LOW_STABILITY_CEILING: u8 = 2;
const LOW_STABILITY_SHARE: f64 = 0.8;
const LOW_STABILITY_MIN_REMAINING: f64 = 1000.0;
const GROWTH_SHARE: f64 = 0.6;
const GROWTH_MIN_REMAINING: f64 = 1500.0;

#[derive(Debug, Clone)]
pub struct RuleBasedPredictor {
    emergency_multiplier: f64,
}

impl RuleBasedPredictor {
    /// `emergency_multiplier` caps the emergency fund as a share of surplus
    pub fn new(emergency_multiplier: f64) -> Self {
        Self {
            emergency_multiplier,
        }
    }

    /// Slice amounts, in bucket order, before conversion to fractions
    fn slices(&self, profile: &UserProfile) -> [(Bucket, f64); 2] {
        let surplus = profile.surplus();

        let emergency = (profile.monthly_expenses() * EMERGENCY_EXPENSE_MONTHS)
            .min(surplus * self.emergency_multiplier);
        let emergency_slice = if emergency >= MIN_EMERGENCY_AMOUNT {
            emergency
        } else {
            0.0
        };

        // the remainder is taken after the computed fund, emitted or not
        let remaining = surplus - emergency;

        let second = if profile.income_stability() <= LOW_STABILITY_CEILING {
            let amount = if remaining >= LOW_STABILITY_MIN_REMAINING {
                remaining * LOW_STABILITY_SHARE
            } else {
                0.0
            };
            (Bucket::Debt, amount)
        } else {
            let amount = if remaining >= GROWTH_MIN_REMAINING {
                remaining * GROWTH_SHARE
            } else {
                0.0
            };
            (Bucket::Equity, amount)
        };

        [(Bucket::EmergencyFund, emergency_slice), second]
    }
}

impl Default for RuleBasedPredictor {
    fn default() -> Self {
        Self::new(DEFAULT_EMERGENCY_MULTIPLIER)
    }
}

/// Product a rule slice is placed in
pub fn rule_product(bucket: Bucket) -> InvestmentType {
    match bucket {
        Bucket::EmergencyFund => InvestmentType::EmergencyFund,
        Bucket::Equity => InvestmentType::MutualFundSip,
        Bucket::Debt => InvestmentType::Fd,
        Bucket::Gold => InvestmentType::Gold,
    }
}

impl AllocationPredictor for RuleBasedPredictor {
    fn variant(&self) -> PredictorVariant {
        PredictorVariant::RuleBased
    }

    fn predict(&self, profile: &UserProfile, _features: &FeatureVector) -> Result<Prediction> {
        let surplus = profile.surplus();
        let slices = self.slices(profile);

        let allocations = slices
            .iter()
            .fold(AllocationSet::zero(), |set, (bucket, amount)| {
                set.with(*bucket, amount / surplus)
            });

        let allocated = allocations.total();
        let expected_return = if allocated > 0.0 {
            slices
                .iter()
                .map(|(bucket, amount)| amount / surplus * rule_product(*bucket).expected_return())
                .sum::<f64>()
                / allocated
        } else {
            super::model::DEFAULT_EXPECTED_RETURN
        };

        debug!(
            ?allocations,
            expected_return,
            stability = profile.income_stability(),
            "Rule-based allocation computed"
        );

        Ok(Prediction {
            allocations,
            basis: AllocationBasis::Sequential,
            expected_return,
            confidence: BucketConfidence::new(),
            variant: PredictorVariant::RuleBased,
            model: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract_features;

    fn predict(age: u32, income: f64, expenses: f64, stability: u8) -> Prediction {
        predict_with(DEFAULT_EMERGENCY_MULTIPLIER, income, expenses, stability, age)
    }

    fn predict_with(
        multiplier: f64,
        income: f64,
        expenses: f64,
        stability: u8,
        age: u32,
    ) -> Prediction {
        let profile = UserProfile::new(age, income, expenses, 0, stability).unwrap();
        RuleBasedPredictor::new(multiplier)
            .predict(&profile, &extract_features(&profile))
            .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_stable_income_goes_to_equity() {
        // surplus 20000: emergency = min(90000, 7000) = 7000, remaining 13000 -> 7800 equity
        let p = predict(30, 50_000.0, 30_000.0, 3);

        assert_eq!(p.basis, AllocationBasis::Sequential);
        assert!(approx(p.allocations.emergency_fund, 0.35));
        assert!(approx(p.allocations.equity, 0.39));
        assert_eq!(p.allocations.debt, 0.0);
        assert_eq!(p.allocations.gold, 0.0);
        assert!(p.confidence.is_empty());
        // (0.35 * 4 + 0.39 * 12) / 0.74
        assert!(approx(p.expected_return, 6.08 / 0.74));
    }

    #[test]
    fn test_low_stability_goes_to_fixed_deposit() {
        let p = predict(30, 50_000.0, 30_000.0, 2);

        assert!(approx(p.allocations.debt, 13_000.0 * 0.8 / 20_000.0));
        assert_eq!(p.allocations.equity, 0.0);
    }

    #[test]
    fn test_emergency_capped_by_expenses() {
        // expenses 100 -> cap 300, below the 500 minimum, so no emergency slice
        let p = predict(30, 40_000.0, 100.0, 4);

        assert_eq!(p.allocations.emergency_fund, 0.0);
        // remaining = 39900 - 300
        assert!(approx(p.allocations.equity, 39_600.0 * 0.6 / 39_900.0));
    }

    #[test]
    fn test_small_surplus_emits_nothing() {
        let p = predict(30, 10_000.0, 9_000.0, 3);

        assert_eq!(p.allocations.total(), 0.0);
        assert_eq!(p.expected_return, 8.0);
    }

    #[test]
    fn test_custom_multiplier() {
        let profile = UserProfile::new(30, 50_000.0, 30_000.0, 0, 3).unwrap();
        let p = RuleBasedPredictor::new(0.4)
            .predict(&profile, &extract_features(&profile))
            .unwrap();

        assert!(approx(p.allocations.emergency_fund, 0.4));
    }

    #[test]
    fn test_emergency_fund_at_minimum_is_kept() {
        // surplus 1000 at multiplier 0.5 -> fund of exactly 500
        let p = predict_with(0.5, 2_000.0, 1_000.0, 3, 30);
        assert_eq!(p.allocations.emergency_fund, 0.5);

        let p = predict_with(0.5, 1_999.0, 1_000.0, 3, 30);
        assert_eq!(p.allocations.emergency_fund, 0.0);
    }

    #[test]
    fn test_fixed_deposit_remaining_minimum() {
        // surplus 2000: fund 1000, remaining exactly 1000
        let p = predict_with(0.5, 3_000.0, 1_000.0, 2, 30);
        assert!(approx(p.allocations.debt, 0.4));

        // surplus 1998: remaining 999
        let p = predict_with(0.5, 2_998.0, 1_000.0, 2, 30);
        assert_eq!(p.allocations.debt, 0.0);
    }

    #[test]
    fn test_equity_remaining_minimum() {
        // surplus 3000: fund 1500, remaining exactly 1500
        let p = predict_with(0.5, 4_000.0, 1_000.0, 3, 30);
        assert!(approx(p.allocations.equity, 0.3));

        // surplus 2998: remaining 1499
        let p = predict_with(0.5, 3_998.0, 1_000.0, 3, 30);
        assert_eq!(p.allocations.equity, 0.0);
    }
}
