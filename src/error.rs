//! Error types for the investment advisor

use thiserror::Error;

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Engine Errors
    // =============================

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Typed rejections produced by the profile validator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Monthly income must be greater than 0")]
    NonPositiveIncome,

    #[error("Monthly expenses cannot be negative")]
    NegativeExpenses,

    #[error("Expenses ({expenses}) must be less than income ({income}) to leave a surplus")]
    NoSurplus { income: f64, expenses: f64 },

    #[error("Field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Field '{field}' is out of range: {detail}")]
    OutOfRange {
        field: &'static str,
        detail: String,
    },

    #[error("Profile must be a JSON object")]
    NotAnObject,
}

impl AdvisorError {
    /// True for failures the caller caused with bad input.
    pub fn is_validation(&self) -> bool {
        matches!(self, AdvisorError::Validation(_))
    }
}
