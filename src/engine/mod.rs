//! Recommendation engine - the main pipeline
//!
//! VALIDATE → FEATURES → PREDICT → NORMALIZE → ASSEMBLE → SUMMARIZE
//!
//! Stateless per call. The only shared state is the immutable model handle.

use crate::assembler::RecommendationAssembler;
use crate::config::EngineConfig;
use crate::error::{AdvisorError, ValidationError};
use crate::features::extract_features;
use crate::models::{
    PredictorVariant, RecommendationResult, ResultMetadata, ResultStatus, UserProfile,
};
use crate::normalizer::normalize;
use crate::predictor::{
    AllocationModel, AllocationPredictor, FallbackPredictor, ModelBackedPredictor,
    ModelMetadata, RuleBasedPredictor,
};
use crate::summary;
use crate::validation::ProfileValidator;
use crate::Result;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const INSUFFICIENT_SURPLUS_MESSAGE: &str =
    "First reduce your expenses or increase your income. You need surplus money to invest.";

const INSUFFICIENT_SURPLUS_SUGGESTIONS: [&str; 4] = [
    "Track every expense for a month to find what can be cut",
    "Trim discretionary spending such as dining out and subscriptions",
    "Look for ways to raise income through a side job or a salary review",
    "Once a surplus appears, start with a small emergency fund",
];

const GENERIC_ERROR_MESSAGE: &str =
    "We could not generate a recommendation right now. Please try again later.";

pub struct RecommendationEngine {
    predictor: Box<dyn AllocationPredictor>,
    rules: RuleBasedPredictor,
    assembler: RecommendationAssembler,
    config: EngineConfig,
    model: Option<Arc<dyn AllocationModel>>,
}

impl RecommendationEngine {
    pub fn new(predictor: Box<dyn AllocationPredictor>, config: EngineConfig) -> Self {
        Self {
            predictor,
            rules: RuleBasedPredictor::new(config.emergency_multiplier),
            assembler: RecommendationAssembler::new(&config),
            config,
            model: None,
        }
    }

    /// Engine that only ever uses the fixed rules
    pub fn rule_based(config: EngineConfig) -> Self {
        let rules = RuleBasedPredictor::new(config.emergency_multiplier);
        Self::new(Box::new(rules), config)
    }

    /// Engine backed by a trained model, falling back to the rules on failure
    pub fn with_model(model: Arc<dyn AllocationModel>, config: EngineConfig) -> Self {
        let predictor = FallbackPredictor::new(
            Box::new(ModelBackedPredictor::new(model.clone())),
            RuleBasedPredictor::new(config.emergency_multiplier),
        );

        let mut engine = Self::new(Box::new(predictor), config);
        engine.model = Some(model);
        engine
    }

    /// Predictor that actually serves requests
    pub fn variant(&self) -> PredictorVariant {
        match &self.model {
            Some(model) if !model.is_available() => PredictorVariant::RuleBased,
            _ => self.predictor.variant(),
        }
    }

    /// Metadata of the loaded model, `None` for a rule-only engine
    pub fn model_metadata(&self) -> Option<Arc<ModelMetadata>> {
        self.model.as_ref().map(|m| m.metadata())
    }

    pub fn model_available(&self) -> bool {
        self.model.as_ref().is_some_and(|m| m.is_available())
    }

    /// Validate a raw profile mapping and produce a recommendation.
    ///
    /// A profile without surplus yields an `insufficient_surplus` result.
    /// Every other validation failure is returned as an error.
    pub fn recommend(&self, raw: &Value) -> Result<RecommendationResult> {
        match ProfileValidator::validate_value(raw) {
            Ok(profile) => Ok(self.recommend_profile(&profile)),
            Err(ValidationError::NoSurplus { income, expenses }) => {
                info!(income, expenses, "No investable surplus");
                Ok(insufficient_surplus(income - expenses))
            }
            Err(e) => Err(AdvisorError::Validation(e)),
        }
    }

    /// Recommendation for an already validated profile
    pub fn recommend_profile(&self, profile: &UserProfile) -> RecommendationResult {
        let result = match self.run(profile, self.predictor.as_ref()) {
            Ok(result) => result,
            Err(e) if self.predictor.variant() != PredictorVariant::RuleBased => {
                warn!(error = %e, "Pipeline failed - retrying with rule-based allocation");
                self.run(profile, &self.rules)
                    .unwrap_or_else(|e| error_result(profile.surplus(), &e))
            }
            Err(e) => error_result(profile.surplus(), &e),
        };

        info!(
            status = ?result.status,
            total_surplus = result.total_surplus,
            items = result.recommendations.len(),
            predictor = ?result.metadata.as_ref().map(|m| m.predictor),
            "Recommendation produced"
        );

        result
    }

    fn run(
        &self,
        profile: &UserProfile,
        predictor: &dyn AllocationPredictor,
    ) -> Result<RecommendationResult> {
        let features = extract_features(profile);
        debug!(risk_capacity = features.risk_capacity(), "Features extracted");

        let prediction = predictor.predict(profile, &features)?;
        let normalized = normalize(&prediction);
        let items = self.assembler.assemble(profile, &prediction, &normalized)?;

        let model = prediction.model.as_deref();
        let metadata = ResultMetadata {
            predictor: prediction.variant,
            expected_portfolio_return: prediction.expected_return,
            mean_confidence: summary::mean_confidence(
                &prediction.confidence,
                self.config.default_confidence,
            ),
            generated_at: Utc::now(),
            training_date: model.and_then(|m| m.training_date.clone()),
            training_samples: model.and_then(|m| m.training_samples),
        };

        let total_surplus = profile.surplus();
        let summary = summary::render(total_surplus, &items, &metadata, model);

        Ok(RecommendationResult {
            status: ResultStatus::Success,
            total_surplus,
            recommendations: items,
            summary,
            message: None,
            suggestions: Vec::new(),
            metadata: Some(metadata),
        })
    }
}

fn insufficient_surplus(total_surplus: f64) -> RecommendationResult {
    RecommendationResult {
        status: ResultStatus::InsufficientSurplus,
        total_surplus,
        recommendations: Vec::new(),
        summary: format!(
            "Monthly surplus is {}; there is nothing to invest yet.",
            summary::format_amount(total_surplus)
        ),
        message: Some(INSUFFICIENT_SURPLUS_MESSAGE.to_string()),
        suggestions: INSUFFICIENT_SURPLUS_SUGGESTIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        metadata: None,
    }
}

fn error_result(total_surplus: f64, cause: &AdvisorError) -> RecommendationResult {
    error!(error = %cause, "Recommendation failed");

    RecommendationResult {
        status: ResultStatus::Error,
        total_surplus,
        recommendations: Vec::new(),
        summary: String::new(),
        message: Some(GENERIC_ERROR_MESSAGE.to_string()),
        suggestions: Vec::new(),
        metadata: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::models::InvestmentType;
    use crate::predictor::model::tests::StubModel;
    use crate::predictor::Prediction;
    use chrono::TimeZone;
    use serde_json::json;

    fn profile_json() -> Value {
        json!({
            "monthly_income": 50000,
            "monthly_expenses": 30000,
            "age": 30,
            "dependents": 1,
            "income_stability": 3
        })
    }

    fn rule_engine() -> RecommendationEngine {
        RecommendationEngine::rule_based(EngineConfig::default())
    }

    fn strip_timestamp(mut result: RecommendationResult) -> RecommendationResult {
        if let Some(metadata) = result.metadata.as_mut() {
            metadata.generated_at = Utc.timestamp_opt(0, 0).unwrap();
        }
        result
    }

    #[test]
    fn test_typical_profile_succeeds() {
        let result = rule_engine().recommend(&profile_json()).unwrap();

        assert_eq!(result.status, ResultStatus::Success);
        assert_eq!(result.total_surplus, 20_000.0);

        let types: Vec<_> = result
            .recommendations
            .iter()
            .map(|i| i.investment_type)
            .collect();
        assert_eq!(
            types,
            vec![InvestmentType::EmergencyFund, InvestmentType::MutualFundSip]
        );

        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.predictor, PredictorVariant::RuleBased);
        assert_eq!(metadata.mean_confidence, 0.8);
        assert!(result.summary.starts_with("Rule-Based Investment Plan"));
    }

    #[test]
    fn test_expenses_over_income_is_insufficient_surplus() {
        let raw = json!({"monthly_income": 20000, "monthly_expenses": 25000});
        let result = rule_engine().recommend(&raw).unwrap();

        assert_eq!(result.status, ResultStatus::InsufficientSurplus);
        assert_eq!(result.total_surplus, -5_000.0);
        assert!(result.recommendations.is_empty());
        assert_eq!(result.suggestions.len(), 4);
        assert!(result.message.is_some());
        assert!(result.metadata.is_none());
    }

    #[test]
    fn test_zero_income_is_validation_error() {
        let raw = json!({"monthly_income": 0, "monthly_expenses": 0});
        let err = rule_engine().recommend(&raw).unwrap_err();

        assert!(err.is_validation());
        assert!(matches!(
            err,
            AdvisorError::Validation(ValidationError::NonPositiveIncome)
        ));
    }

    #[test]
    fn test_model_failure_is_transparent() {
        let mut broken = StubModel::new([0.3, 0.4, 0.2, 0.1]);
        broken.available = false;

        let with_model =
            RecommendationEngine::with_model(Arc::new(broken), EngineConfig::default());
        let fallback = with_model.recommend(&profile_json()).unwrap();
        let rules = rule_engine().recommend(&profile_json()).unwrap();

        assert_eq!(strip_timestamp(fallback), strip_timestamp(rules));
    }

    #[test]
    fn test_model_path_result() {
        let model = StubModel::new([0.2, 0.5, 0.3, 0.0]);
        let engine = RecommendationEngine::with_model(Arc::new(model), EngineConfig::default());
        let result = engine.recommend(&profile_json()).unwrap();

        assert_eq!(engine.variant(), PredictorVariant::ModelBacked);
        assert_eq!(result.status, ResultStatus::Success);

        let priorities: Vec<_> = result.recommendations.iter().map(|i| i.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);

        let total: f64 = result.recommendations.iter().map(|i| i.percentage).sum();
        assert!((total - 100.0).abs() < 1e-6);

        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.predictor, PredictorVariant::ModelBacked);
        assert_eq!(metadata.expected_portfolio_return, 10.0);
        assert_eq!(metadata.training_samples, Some(5000));
        assert!((metadata.mean_confidence - 0.75).abs() < 1e-12);
        assert!(result.summary.contains("Model Insights"));
    }

    #[test]
    fn test_idempotent_apart_from_timestamp() {
        let engine = RecommendationEngine::with_model(
            Arc::new(StubModel::new([0.3, 0.4, 0.2, 0.1])),
            EngineConfig::default(),
        );

        let first = engine.recommend(&profile_json()).unwrap();
        let second = engine.recommend(&profile_json()).unwrap();
        assert_eq!(strip_timestamp(first), strip_timestamp(second));
    }

    struct FailingPredictor;

    impl AllocationPredictor for FailingPredictor {
        fn variant(&self) -> PredictorVariant {
            PredictorVariant::RuleBased
        }

        fn predict(&self, _profile: &UserProfile, _features: &FeatureVector) -> Result<Prediction> {
            Err(AdvisorError::Computation("allocation overflow".to_string()))
        }
    }

    #[test]
    fn test_unrecoverable_failure_hides_detail() {
        let engine = RecommendationEngine::new(Box::new(FailingPredictor), EngineConfig::default());
        let result = engine.recommend(&profile_json()).unwrap();

        assert_eq!(result.status, ResultStatus::Error);
        assert!(result.recommendations.is_empty());
        assert!(result.metadata.is_none());

        let message = result.message.unwrap();
        assert!(!message.contains("overflow"));
    }

    #[test]
    fn test_model_metadata_exposed() {
        assert!(rule_engine().model_metadata().is_none());
        assert!(!rule_engine().model_available());

        let engine = RecommendationEngine::with_model(
            Arc::new(StubModel::new([0.3, 0.4, 0.2, 0.1])),
            EngineConfig::default(),
        );
        assert!(engine.model_available());
        assert_eq!(
            engine.model_metadata().unwrap().training_date.as_deref(),
            Some("2024-01-01")
        );
    }

    #[test]
    fn test_unavailable_model_reports_rules() {
        let mut broken = StubModel::new([0.3, 0.4, 0.2, 0.1]);
        broken.available = false;

        let engine = RecommendationEngine::with_model(Arc::new(broken), EngineConfig::default());
        assert_eq!(engine.variant(), PredictorVariant::RuleBased);
        assert!(engine.model_metadata().is_some());
    }

    #[test]
    fn test_zero_surplus_is_insufficient() {
        let raw = json!({"monthly_income": 30000, "monthly_expenses": 30000});
        let result = rule_engine().recommend(&raw).unwrap();

        assert_eq!(result.status, ResultStatus::InsufficientSurplus);
        assert_eq!(result.total_surplus, 0.0);
        assert!(result.recommendations.is_empty());
        assert_eq!(result.suggestions.len(), 4);
    }

    #[test]
    fn test_missing_emergency_slice_keeps_priorities_contiguous() {
        // expenses of 100 cap the fund below its minimum
        let raw = json!({
            "monthly_income": 40000,
            "monthly_expenses": 100,
            "income_stability": 4
        });
        let result = rule_engine().recommend(&raw).unwrap();

        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.recommendations[0].priority, 1);
        assert_eq!(
            result.recommendations[0].investment_type,
            InvestmentType::MutualFundSip
        );
    }
}
