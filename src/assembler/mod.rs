//! Recommendation assembly
//!
//! Turns normalized fractions into ordered, explained line items.
//! Buckets are visited in fixed order and every bucket is sized against the
//! total surplus.

use crate::catalog::how_to_start;
use crate::config::EngineConfig;
use crate::error::AdvisorError;
use crate::models::{
    AllocationSet, Bucket, BucketConfidence, InvestmentType, PredictorVariant,
    RecommendationItem, UserProfile,
};
use crate::predictor::rules::rule_product;
use crate::predictor::{AllocationBasis, Prediction};
use crate::Result;
use tracing::debug;

/// Debt allocations above this amount go to PPF for younger investors
const PPF_MIN_AMOUNT: f64 = 12_000.0;
const PPF_MAX_AGE: u32 = 50;

pub struct RecommendationAssembler {
    materiality_threshold: f64,
    default_confidence: f64,
}

impl RecommendationAssembler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            materiality_threshold: config.materiality_threshold,
            default_confidence: config.default_confidence,
        }
    }

    /// Build line items from a prediction and its normalized fractions
    pub fn assemble(
        &self,
        profile: &UserProfile,
        prediction: &Prediction,
        normalized: &AllocationSet,
    ) -> Result<Vec<RecommendationItem>> {
        let surplus = profile.surplus();
        let mut items = Vec::with_capacity(Bucket::ALL.len());
        let mut priority = 1;

        for (bucket, fraction) in normalized.iter() {
            if !self.is_material(prediction.basis, fraction) {
                debug!(%bucket, fraction, "Bucket suppressed");
                continue;
            }

            let amount = surplus * fraction;
            if !amount.is_finite() {
                return Err(AdvisorError::Computation(format!(
                    "non-finite amount for {}",
                    bucket
                )));
            }

            let investment_type = refine(bucket, amount, profile.age(), prediction.basis);
            let percentage = fraction * 100.0;

            items.push(RecommendationItem {
                priority,
                investment_type,
                amount,
                percentage,
                reason: reason(bucket, percentage, prediction.variant),
                how_to_start: how_to_start(investment_type).to_string(),
                expected_return: investment_type.expected_return(),
                confidence: item_confidence(&prediction.confidence, bucket, self.default_confidence),
            });
            priority += 1;
        }

        Ok(items)
    }

    fn is_material(&self, basis: AllocationBasis, fraction: f64) -> bool {
        match basis {
            AllocationBasis::Joint => fraction > self.materiality_threshold,
            // rule thresholds were already applied to amounts
            AllocationBasis::Sequential => fraction > 0.0,
        }
    }
}

/// Concrete product for a bucket
pub fn refine(bucket: Bucket, amount: f64, age: u32, basis: AllocationBasis) -> InvestmentType {
    match (bucket, basis) {
        (Bucket::Debt, AllocationBasis::Joint) => {
            if amount > PPF_MIN_AMOUNT && age < PPF_MAX_AGE {
                InvestmentType::Ppf
            } else {
                InvestmentType::Fd
            }
        }
        (bucket, _) => rule_product(bucket),
    }
}

fn item_confidence(confidence: &BucketConfidence, bucket: Bucket, default: f64) -> f64 {
    confidence.get(&bucket).copied().unwrap_or(default)
}

fn reason(bucket: Bucket, percentage: f64, variant: PredictorVariant) -> String {
    let source = match variant {
        PredictorVariant::ModelBacked => "ML model recommends",
        PredictorVariant::RuleBased => "Rule-based plan sets aside",
    };

    let purpose = match bucket {
        Bucket::EmergencyFund => {
            "as an emergency fund, sized to your risk profile and income stability"
        }
        Bucket::Equity => "for equity growth, calibrated to your age and risk capacity",
        Bucket::Debt => "for debt instruments, adding stability and consistent returns",
        Bucket::Gold => "for gold, hedging inflation and diversifying the portfolio",
    };

    format!("{} {:.1}% {}", source, percentage, purpose)
}
