//! Linear model artifact
//!
//! A JSON-serialized set of standard-scaler parameters plus one linear
//! regressor per bucket target and an optional return regressor. Weight
//! vectors are positional and follow `FEATURE_NAMES`.

use super::model::{AllocationModel, ModelMetadata};
use crate::error::AdvisorError;
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::models::Bucket;
use crate::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        if self.mean.len() != features.len() || self.scale.len() != features.len() {
            return Err(AdvisorError::Computation(format!(
                "scaler expects {} features, got {}",
                self.mean.len(),
                features.len()
            )));
        }

        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                // zero-variance columns are only centered
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub weights: Vec<f64>,
    pub intercept: f64,
    /// Cross-validation score, reported as per-bucket confidence
    #[serde(default)]
    pub cv_score: Option<f64>,
}

impl LinearRegressor {
    pub fn predict(&self, x: &[f64]) -> Result<f64> {
        if self.weights.len() != x.len() {
            return Err(AdvisorError::Computation(format!(
                "regressor expects {} inputs, got {}",
                self.weights.len(),
                x.len()
            )));
        }

        Ok(self.intercept + self.weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>())
    }
}

/// On-disk layout of a linear model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    /// Keyed by bucket target name, e.g. `equity_allocation`
    pub allocators: BTreeMap<String, LinearRegressor>,
    #[serde(default)]
    pub return_predictor: Option<LinearRegressor>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub training_date: Option<String>,
    #[serde(default)]
    pub training_samples: Option<u64>,
}

pub struct LinearModel {
    artifact: ModelArtifact,
    metadata: Arc<ModelMetadata>,
    available: bool,
}

impl LinearModel {
    pub fn from_artifact(artifact: ModelArtifact, fingerprint: Option<String>) -> Self {
        let available = check_artifact(&artifact);

        let metadata = Arc::new(ModelMetadata {
            model_version: artifact.model_version.clone(),
            training_date: artifact.training_date.clone(),
            training_samples: artifact.training_samples,
            feature_names: artifact.feature_names.clone(),
            fingerprint,
        });

        Self {
            artifact,
            metadata,
            available,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        Ok(Self::from_artifact(artifact, Some(fingerprint(json.as_bytes()))))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
        let model = Self::from_artifact(artifact, Some(fingerprint(&bytes)));

        info!(
            path = %path.display(),
            available = model.available,
            training_date = ?model.metadata.training_date,
            training_samples = ?model.metadata.training_samples,
            "Model artifact loaded"
        );

        Ok(model)
    }

    fn regressor(&self, bucket: Bucket) -> Result<&LinearRegressor> {
        self.artifact
            .allocators
            .get(bucket.target_name())
            .ok_or_else(|| {
                AdvisorError::ModelUnavailable(format!("no regressor for {}", bucket.target_name()))
            })
    }
}

/// SHA-256 of raw artifact bytes
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// The artifact must match the feature contract exactly to be usable
fn check_artifact(artifact: &ModelArtifact) -> bool {
    let names_match = artifact.feature_names.len() == FEATURE_COUNT
        && artifact
            .feature_names
            .iter()
            .zip(FEATURE_NAMES)
            .all(|(a, b)| a == b);
    if !names_match {
        warn!(
            feature_names = ?artifact.feature_names,
            "Artifact feature order does not match the extractor"
        );
        return false;
    }

    if artifact.scaler.mean.len() != FEATURE_COUNT || artifact.scaler.scale.len() != FEATURE_COUNT {
        warn!("Artifact scaler has the wrong width");
        return false;
    }

    let regressors_ok = Bucket::ALL.iter().all(|bucket| {
        artifact
            .allocators
            .get(bucket.target_name())
            .map(|r| r.weights.len() == FEATURE_COUNT)
            .unwrap_or(false)
    });
    if !regressors_ok {
        warn!("Artifact is missing a bucket regressor or has the wrong width");
    }
    regressors_ok
}

impl AllocationModel for LinearModel {
    fn is_available(&self) -> bool {
        self.available
    }

    fn scale(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        self.artifact.scaler.transform(features.as_slice())
    }

    fn predict_bucket(&self, bucket: Bucket, scaled: &[f64]) -> Result<f64> {
        self.regressor(bucket)?.predict(scaled)
    }

    fn predict_return(&self, scaled: &[f64]) -> Option<Result<f64>> {
        self.artifact
            .return_predictor
            .as_ref()
            .map(|r| r.predict(scaled))
    }

    fn bucket_confidence(&self, bucket: Bucket) -> Option<f64> {
        self.regressor(bucket).ok().and_then(|r| r.cv_score)
    }

    fn metadata(&self) -> Arc<ModelMetadata> {
        Arc::clone(&self.metadata)
    }
}
