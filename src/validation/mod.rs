//! Profile validation
//!
//! Coerces a flat name → value mapping into a `UserProfile`.
//! Money fields are checked before anything else so a missing surplus
//! is always reported as `NoSurplus`, whatever the other fields hold.

use crate::error::ValidationError;
use crate::models::UserProfile;
use serde_json::{Map, Value};
use tracing::debug;

pub const DEFAULT_AGE: u32 = 30;
pub const DEFAULT_INCOME_STABILITY: u8 = 3;
pub const DEFAULT_DEPENDENTS: u32 = 0;

type Validated<T> = std::result::Result<T, ValidationError>;

/// Stateless validator for raw profile input
pub struct ProfileValidator;

impl ProfileValidator {
    /// Validate any JSON value; anything other than an object is rejected
    pub fn validate_value(raw: &Value) -> Validated<UserProfile> {
        match raw.as_object() {
            Some(fields) => Self::validate(fields),
            None => Err(ValidationError::NotAnObject),
        }
    }

    /// Validate a flat field mapping
    pub fn validate(fields: &Map<String, Value>) -> Validated<UserProfile> {
        let result = Self::coerce(fields);

        if let Err(e) = &result {
            debug!(error = %e, "Profile rejected");
        }

        result
    }

    fn coerce(fields: &Map<String, Value>) -> Validated<UserProfile> {
        let income = lookup(fields, &["monthly_income", "avg_monthly_income"])
            .map(|v| number("monthly_income", v))
            .transpose()?
            .unwrap_or(0.0);

        let expenses = lookup(fields, &["monthly_expenses"])
            .map(|v| number("monthly_expenses", v))
            .transpose()?
            .unwrap_or(0.0);

        if income <= 0.0 {
            return Err(ValidationError::NonPositiveIncome);
        }
        if expenses < 0.0 {
            return Err(ValidationError::NegativeExpenses);
        }
        if expenses >= income {
            return Err(ValidationError::NoSurplus { income, expenses });
        }

        let age = lookup(fields, &["age"])
            .map(|v| non_negative("age", v))
            .transpose()?
            .unwrap_or(DEFAULT_AGE);

        let dependents = lookup(fields, &["dependents"])
            .map(|v| non_negative("dependents", v))
            .transpose()?
            .unwrap_or(DEFAULT_DEPENDENTS);

        let income_stability = match lookup(fields, &["income_stability"]) {
            Some(v) => {
                let raw = non_negative("income_stability", v)?;
                u8::try_from(raw).map_err(|_| ValidationError::OutOfRange {
                    field: "income_stability",
                    detail: format!("{} is outside 1-5", raw),
                })?
            }
            None => DEFAULT_INCOME_STABILITY,
        };

        UserProfile::new(age, income, expenses, dependents, income_stability)
    }
}

/// First present, non-null value among `keys`
fn lookup<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| fields.get(*k))
        .find(|v| !v.is_null())
}

fn number(field: &'static str, value: &Value) -> Validated<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|n| n.is_finite())
        .ok_or(ValidationError::InvalidField {
            field,
            expected: "a finite number",
        })
}

fn non_negative(field: &'static str, value: &Value) -> Validated<u32> {
    let invalid = ValidationError::InvalidField {
        field,
        expected: "a non-negative integer",
    };

    let n = number(field, value).map_err(|_| invalid.clone())?;
    if n.fract() != 0.0 || n < 0.0 || n > u32::MAX as f64 {
        return Err(invalid);
    }

    Ok(n as u32)
}

//
// ================= Tests =================
//
