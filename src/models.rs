//! Core data models for the investment advisor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ValidationError;

//
// ================= Enums =================
//

/// High-level allocation category. Declaration order is the emission order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    EmergencyFund,
    Equity,
    Debt,
    Gold,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::EmergencyFund,
        Bucket::Equity,
        Bucket::Debt,
        Bucket::Gold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::EmergencyFund => "emergency_fund",
            Bucket::Equity => "equity",
            Bucket::Debt => "debt",
            Bucket::Gold => "gold",
        }
    }

    /// Name of the regression target a model publishes for this bucket
    pub fn target_name(&self) -> &'static str {
        match self {
            Bucket::EmergencyFund => "emergency_fund_allocation",
            Bucket::Equity => "equity_allocation",
            Bucket::Debt => "debt_allocation",
            Bucket::Gold => "gold_allocation",
        }
    }
}

/// Concrete product a bucket resolves to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentType {
    EmergencyFund,
    Fd,
    MutualFundSip,
    Ppf,
    Gold,
    RecurringDeposit,
}

impl InvestmentType {
    pub const ALL: [InvestmentType; 6] = [
        InvestmentType::EmergencyFund,
        InvestmentType::Fd,
        InvestmentType::MutualFundSip,
        InvestmentType::Ppf,
        InvestmentType::Gold,
        InvestmentType::RecurringDeposit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentType::EmergencyFund => "emergency_fund",
            InvestmentType::Fd => "fd",
            InvestmentType::MutualFundSip => "mutual_fund_sip",
            InvestmentType::Ppf => "ppf",
            InvestmentType::Gold => "gold",
            InvestmentType::RecurringDeposit => "recurring_deposit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Annualized return assumed for the product, in percent
    pub fn expected_return(&self) -> f64 {
        match self {
            InvestmentType::EmergencyFund => 4.0,
            InvestmentType::Fd => 6.8,
            InvestmentType::MutualFundSip => 12.0,
            InvestmentType::Ppf => 7.1,
            InvestmentType::Gold => 8.0,
            InvestmentType::RecurringDeposit => 6.5,
        }
    }
}

/// Which predictor produced an allocation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PredictorVariant {
    ModelBacked,
    RuleBased,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Success,
    InsufficientSurplus,
    Error,
}

//
// ================= Profile =================
//

/// Validated, immutable financial profile. Construction guarantees a positive surplus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    age: u32,
    monthly_income: f64,
    monthly_expenses: f64,
    dependents: u32,
    income_stability: u8,
}

impl UserProfile {
    pub fn new(
        age: u32,
        monthly_income: f64,
        monthly_expenses: f64,
        dependents: u32,
        income_stability: u8,
    ) -> std::result::Result<Self, ValidationError> {
        if !monthly_income.is_finite() {
            return Err(ValidationError::InvalidField {
                field: "monthly_income",
                expected: "a finite number",
            });
        }
        if !monthly_expenses.is_finite() {
            return Err(ValidationError::InvalidField {
                field: "monthly_expenses",
                expected: "a finite number",
            });
        }
        if monthly_income <= 0.0 {
            return Err(ValidationError::NonPositiveIncome);
        }
        if monthly_expenses < 0.0 {
            return Err(ValidationError::NegativeExpenses);
        }
        if monthly_expenses >= monthly_income {
            return Err(ValidationError::NoSurplus {
                income: monthly_income,
                expenses: monthly_expenses,
            });
        }
        if !(18..=100).contains(&age) {
            return Err(ValidationError::OutOfRange {
                field: "age",
                detail: format!("{} is outside 18-100", age),
            });
        }
        if !(1..=5).contains(&income_stability) {
            return Err(ValidationError::OutOfRange {
                field: "income_stability",
                detail: format!("{} is outside 1-5", income_stability),
            });
        }

        Ok(Self {
            age,
            monthly_income,
            monthly_expenses,
            dependents,
            income_stability,
        })
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn monthly_income(&self) -> f64 {
        self.monthly_income
    }

    pub fn monthly_expenses(&self) -> f64 {
        self.monthly_expenses
    }

    pub fn dependents(&self) -> u32 {
        self.dependents
    }

    pub fn income_stability(&self) -> u8 {
        self.income_stability
    }

    pub fn surplus(&self) -> f64 {
        self.monthly_income - self.monthly_expenses
    }
}

//
// ================= Allocation =================
//

/// Fraction of surplus per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationSet {
    pub emergency_fund: f64,
    pub equity: f64,
    pub debt: f64,
    pub gold: f64,
}

impl AllocationSet {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_fn(mut f: impl FnMut(Bucket) -> f64) -> Self {
        Self {
            emergency_fund: f(Bucket::EmergencyFund),
            equity: f(Bucket::Equity),
            debt: f(Bucket::Debt),
            gold: f(Bucket::Gold),
        }
    }

    pub fn get(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::EmergencyFund => self.emergency_fund,
            Bucket::Equity => self.equity,
            Bucket::Debt => self.debt,
            Bucket::Gold => self.gold,
        }
    }

    /// Copy with one bucket replaced
    pub fn with(self, bucket: Bucket, value: f64) -> Self {
        Self::from_fn(|b| if b == bucket { value } else { self.get(b) })
    }

    pub fn total(&self) -> f64 {
        Bucket::ALL.iter().map(|b| self.get(*b)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, f64)> + '_ {
        Bucket::ALL.into_iter().map(move |b| (b, self.get(b)))
    }
}

/// Per-bucket confidence published by a predictor
pub type BucketConfidence = BTreeMap<Bucket, f64>;

//
// ================= Recommendation =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub priority: u32,
    pub investment_type: InvestmentType,
    pub amount: f64,
    pub percentage: f64,
    pub reason: String,
    pub how_to_start: String,
    pub expected_return: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub predictor: PredictorVariant,
    pub expected_portfolio_return: f64,
    pub mean_confidence: f64,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_samples: Option<u64>,
}

//
// ================= Final Result =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub status: ResultStatus,
    pub total_surplus: f64,
    pub recommendations: Vec<RecommendationItem>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResultMetadata>,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for InvestmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for PredictorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PredictorVariant::ModelBacked => "ML-Powered",
            PredictorVariant::RuleBased => "Rule-based",
        };
        write!(f, "{}", s)
    }
}
