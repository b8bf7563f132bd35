//! Model-backed predictor
//!
//! The trained model is an opaque, shared, read-only capability. It is loaded
//! once at startup and handed to every request by `Arc`.

use super::{AllocationBasis, AllocationPredictor, Prediction};
use crate::error::AdvisorError;
use crate::features::FeatureVector;
use crate::models::{AllocationSet, Bucket, BucketConfidence, PredictorVariant, UserProfile};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_EXPECTED_RETURN: f64 = 8.0;
pub const MIN_EXPECTED_RETURN: f64 = 4.0;
pub const MAX_EXPECTED_RETURN: f64 = 18.0;

/// Training information carried alongside a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub training_date: Option<String>,
    #[serde(default)]
    pub training_samples: Option<u64>,
    #[serde(default)]
    pub feature_names: Vec<String>,
    /// SHA-256 of the artifact the model was loaded from
    #[serde(default)]
    pub fingerprint: Option<String>,
}

/// Capability exposed by a pre-trained allocation model
pub trait AllocationModel: Send + Sync {
    fn is_available(&self) -> bool;

    /// Mean/variance scaling fit at training time
    fn scale(&self, features: &FeatureVector) -> Result<Vec<f64>>;

    /// Raw prediction for one bucket target
    fn predict_bucket(&self, bucket: Bucket, scaled: &[f64]) -> Result<f64>;

    /// `None` when the model ships no return regressor
    fn predict_return(&self, scaled: &[f64]) -> Option<Result<f64>>;

    /// Validation score for a bucket target, if published
    fn bucket_confidence(&self, _bucket: Bucket) -> Option<f64> {
        None
    }

    fn metadata(&self) -> Arc<ModelMetadata>;
}

pub struct ModelBackedPredictor {
    model: Arc<dyn AllocationModel>,
}

impl ModelBackedPredictor {
    pub fn new(model: Arc<dyn AllocationModel>) -> Self {
        Self { model }
    }

    fn expected_return(&self, scaled: &[f64]) -> f64 {
        match self.model.predict_return(scaled) {
            None => DEFAULT_EXPECTED_RETURN,
            Some(Ok(value)) if value.is_finite() => {
                value.clamp(MIN_EXPECTED_RETURN, MAX_EXPECTED_RETURN)
            }
            Some(Ok(value)) => {
                warn!(value, "Non-finite return prediction - using default");
                DEFAULT_EXPECTED_RETURN
            }
            Some(Err(e)) => {
                warn!(error = %e, "Return prediction failed - using default");
                DEFAULT_EXPECTED_RETURN
            }
        }
    }
}

impl AllocationPredictor for ModelBackedPredictor {
    fn variant(&self) -> PredictorVariant {
        PredictorVariant::ModelBacked
    }

    fn predict(&self, _profile: &UserProfile, features: &FeatureVector) -> Result<Prediction> {
        if !self.model.is_available() {
            return Err(AdvisorError::ModelUnavailable(
                "model artifact not loaded".to_string(),
            ));
        }

        let scaled = self.model.scale(features).map_err(|e| {
            AdvisorError::ModelUnavailable(format!("feature scaling failed: {}", e))
        })?;

        let mut allocations = AllocationSet::zero();
        let mut confidence = BucketConfidence::new();

        for bucket in Bucket::ALL {
            let raw = self.model.predict_bucket(bucket, &scaled).map_err(|e| {
                AdvisorError::ModelUnavailable(format!("{} prediction failed: {}", bucket, e))
            })?;

            if !raw.is_finite() {
                return Err(AdvisorError::ModelUnavailable(format!(
                    "{} prediction is not finite",
                    bucket
                )));
            }

            allocations = allocations.with(bucket, raw.clamp(0.0, 1.0));

            match self.model.bucket_confidence(bucket) {
                Some(score) if score.is_finite() => {
                    confidence.insert(bucket, score.clamp(0.0, 1.0));
                }
                Some(score) => warn!(%bucket, score, "Non-finite bucket confidence ignored"),
                None => {}
            }
        }

        let expected_return = self.expected_return(&scaled);

        debug!(
            ?allocations,
            expected_return,
            "Model allocation predicted"
        );

        Ok(Prediction {
            allocations,
            basis: AllocationBasis::Joint,
            expected_return,
            confidence,
            variant: PredictorVariant::ModelBacked,
            model: Some(self.model.metadata()),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::extract_features;

    /// Fixed-output model for tests
    pub(crate) struct StubModel {
        pub available: bool,
        pub raw: [f64; 4],
        pub expected_return: Option<f64>,
        pub fail_bucket: Option<Bucket>,
        pub fail_scaling: bool,
        pub confidence: f64,
    }

    impl StubModel {
        pub(crate) fn new(raw: [f64; 4]) -> Self {
            Self {
                available: true,
                raw,
                expected_return: Some(10.0),
                fail_bucket: None,
                fail_scaling: false,
                confidence: 0.75,
            }
        }
    }

    impl AllocationModel for StubModel {
        fn is_available(&self) -> bool {
            self.available
        }

        fn scale(&self, features: &FeatureVector) -> Result<Vec<f64>> {
            if self.fail_scaling {
                return Err(AdvisorError::Computation("scaler mismatch".to_string()));
            }
            Ok(features.as_slice().to_vec())
        }

        fn predict_bucket(&self, bucket: Bucket, _scaled: &[f64]) -> Result<f64> {
            if self.fail_bucket == Some(bucket) {
                return Err(AdvisorError::Computation("regressor failed".to_string()));
            }
            let index = Bucket::ALL.iter().position(|b| *b == bucket).unwrap();
            Ok(self.raw[index])
        }

        fn predict_return(&self, _scaled: &[f64]) -> Option<Result<f64>> {
            self.expected_return.map(Ok)
        }

        fn bucket_confidence(&self, bucket: Bucket) -> Option<f64> {
            match bucket {
                Bucket::Gold => None,
                _ => Some(self.confidence),
            }
        }

        fn metadata(&self) -> Arc<ModelMetadata> {
            Arc::new(ModelMetadata {
                training_date: Some("2024-01-01".to_string()),
                training_samples: Some(5000),
                ..Default::default()
            })
        }
    }

    fn predict_with(model: StubModel) -> Result<Prediction> {
        let profile = UserProfile::new(30, 50_000.0, 30_000.0, 1, 3).unwrap();
        let features = extract_features(&profile);
        ModelBackedPredictor::new(Arc::new(model)).predict(&profile, &features)
    }

    #[test]
    fn test_clamps_each_bucket() {
        let prediction = predict_with(StubModel::new([1.4, 0.5, -0.2, 0.1])).unwrap();

        assert_eq!(prediction.basis, AllocationBasis::Joint);
        assert_eq!(prediction.allocations.emergency_fund, 1.0);
        assert_eq!(prediction.allocations.debt, 0.0);
        assert_eq!(prediction.confidence.len(), 3);
        assert_eq!(prediction.expected_return, 10.0);
    }

    #[test]
    fn test_non_finite_confidence_is_dropped() {
        let mut model = StubModel::new([0.3, 0.4, 0.2, 0.1]);
        model.confidence = f64::NAN;
        let prediction = predict_with(model).unwrap();

        assert!(prediction.confidence.is_empty());
        assert_eq!(prediction.allocations.equity, 0.4);
    }

    #[test]
    fn test_expected_return_clamped_or_defaulted() {
        let mut model = StubModel::new([0.3, 0.4, 0.2, 0.1]);
        model.expected_return = Some(25.0);
        assert_eq!(predict_with(model).unwrap().expected_return, 18.0);

        let mut model = StubModel::new([0.3, 0.4, 0.2, 0.1]);
        model.expected_return = Some(1.0);
        assert_eq!(predict_with(model).unwrap().expected_return, 4.0);

        let mut model = StubModel::new([0.3, 0.4, 0.2, 0.1]);
        model.expected_return = None;
        assert_eq!(predict_with(model).unwrap().expected_return, 8.0);
    }

    #[test]
    fn test_failures_report_unavailable() {
        let mut unavailable = StubModel::new([0.3, 0.4, 0.2, 0.1]);
        unavailable.available = false;

        let mut scaling = StubModel::new([0.3, 0.4, 0.2, 0.1]);
        scaling.fail_scaling = true;

        let mut bucket = StubModel::new([0.3, 0.4, 0.2, 0.1]);
        bucket.fail_bucket = Some(Bucket::Debt);

        let mut non_finite = StubModel::new([0.3, f64::NAN, 0.2, 0.1]);
        non_finite.expected_return = None;

        for model in [unavailable, scaling, bucket, non_finite] {
            let err = predict_with(model).unwrap_err();
            assert!(matches!(err, AdvisorError::ModelUnavailable(_)), "{:?}", err);
        }
    }
}
