//! Allocation predictors
//!
//! A predictor maps a profile and its features to raw per-bucket fractions.
//! Two implementations exist: one backed by a trained model, one by fixed
//! rules. The engine never inspects which one it holds.

use crate::features::FeatureVector;
use crate::models::{AllocationSet, BucketConfidence, PredictorVariant, UserProfile};
use crate::Result;
use std::sync::Arc;
use tracing::warn;

pub mod linear;
pub mod model;
pub mod rules;

pub use linear::LinearModel;
pub use model::{AllocationModel, ModelBackedPredictor, ModelMetadata};
pub use rules::RuleBasedPredictor;

/// How the fractions of a prediction relate to the surplus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationBasis {
    /// Fractions were predicted jointly over the total surplus and still need normalizing
    Joint,
    /// Fractions are already-disjoint slices carved out one after another
    Sequential,
}

/// Raw predictor output
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub allocations: AllocationSet,
    pub basis: AllocationBasis,
    /// Annualized portfolio return, in percent
    pub expected_return: f64,
    pub confidence: BucketConfidence,
    pub variant: PredictorVariant,
    pub model: Option<Arc<ModelMetadata>>,
}

/// Trait for allocation prediction (sync, no I/O)
pub trait AllocationPredictor: Send + Sync {
    fn variant(&self) -> PredictorVariant;

    fn predict(&self, profile: &UserProfile, features: &FeatureVector) -> Result<Prediction>;
}

/// Tries a primary predictor and silently substitutes the rules on any failure
pub struct FallbackPredictor {
    primary: Box<dyn AllocationPredictor>,
    fallback: RuleBasedPredictor,
}

impl FallbackPredictor {
    pub fn new(primary: Box<dyn AllocationPredictor>, fallback: RuleBasedPredictor) -> Self {
        Self { primary, fallback }
    }
}

impl AllocationPredictor for FallbackPredictor {
    fn variant(&self) -> PredictorVariant {
        self.primary.variant()
    }

    fn predict(&self, profile: &UserProfile, features: &FeatureVector) -> Result<Prediction> {
        match self.primary.predict(profile, features) {
            Ok(prediction) => Ok(prediction),
            Err(e) => {
                warn!(
                    error = %e,
                    primary = %self.primary.variant(),
                    "Primary predictor failed - using rule-based allocation"
                );
                self.fallback.predict(profile, features)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdvisorError;
    use crate::features::extract_features;

    struct BrokenPredictor;

    impl AllocationPredictor for BrokenPredictor {
        fn variant(&self) -> PredictorVariant {
            PredictorVariant::ModelBacked
        }

        fn predict(&self, _profile: &UserProfile, _features: &FeatureVector) -> Result<Prediction> {
            Err(AdvisorError::ModelUnavailable("no artifact".to_string()))
        }
    }

    #[test]
    fn test_fallback_matches_rules() {
        let profile = UserProfile::new(30, 50_000.0, 30_000.0, 1, 3).unwrap();
        let features = extract_features(&profile);

        let rules = RuleBasedPredictor::default();
        let chained = FallbackPredictor::new(Box::new(BrokenPredictor), RuleBasedPredictor::default());

        assert_eq!(chained.variant(), PredictorVariant::ModelBacked);
        assert_eq!(
            chained.predict(&profile, &features).unwrap(),
            rules.predict(&profile, &features).unwrap()
        );
    }
}
