//! Feature engineering and risk scoring
//!
//! The feature order below is a contract with every model artifact:
//! weights and scaler parameters are stored positionally.

use crate::models::UserProfile;
use serde::Serialize;

pub const FEATURE_COUNT: usize = 11;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "monthly_income",
    "monthly_expenses",
    "surplus",
    "dependents",
    "income_stability",
    "surplus_to_income_ratio",
    "expense_ratio",
    "risk_capacity",
    "age_income_interaction",
    "stability_surplus_interaction",
];

/// Index of risk capacity inside the feature vector
const RISK_CAPACITY_INDEX: usize = 8;

/// Ordered model input derived from a profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn risk_capacity(&self) -> f64 {
        self.0[RISK_CAPACITY_INDEX]
    }

    /// Value by feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }
}

/// Build the 11-element feature vector for a profile
pub fn extract_features(profile: &UserProfile) -> FeatureVector {
    build_features(
        profile.age() as f64,
        profile.monthly_income(),
        profile.monthly_expenses(),
        profile.dependents() as f64,
        profile.income_stability() as f64,
    )
}

fn build_features(
    age: f64,
    income: f64,
    expenses: f64,
    dependents: f64,
    stability: f64,
) -> FeatureVector {
    let surplus = income - expenses;

    let surplus_to_income_ratio = if income > 0.0 { surplus / income } else { 0.0 };
    // income of zero means everything is consumed
    let expense_ratio = if income > 0.0 { expenses / income } else { 1.0 };

    let risk = risk_capacity(age, stability, dependents, surplus);

    FeatureVector([
        age,
        income,
        expenses,
        surplus,
        dependents,
        stability,
        surplus_to_income_ratio,
        expense_ratio,
        risk,
        age * income / 100_000.0,
        stability * surplus / 1000.0,
    ])
}

/// Heuristic ability to bear volatility, in [1, 10].
///
/// The age bands are evaluated as one chain: `< 30`, `< 40`, `> 55`, `> 50`.
/// Every adjustment is applied before the final clamp.
pub fn risk_capacity(age: f64, income_stability: f64, dependents: f64, surplus: f64) -> f64 {
    let mut score = 5.0;

    if age < 30.0 {
        score += 2.0;
    } else if age < 40.0 {
        score += 1.0;
    } else if age > 55.0 {
        score -= 2.0;
    } else if age > 50.0 {
        score -= 1.0;
    }

    score += income_stability - 3.0;

    score -= dependents * 0.5;

    if surplus > 50_000.0 {
        score += 2.0;
    } else if surplus > 20_000.0 {
        score += 1.0;
    } else if surplus < 10_000.0 {
        score -= 1.0;
    }

    score.clamp(1.0, 10.0)
}
