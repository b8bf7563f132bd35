//! Runtime configuration
//!
//! `Settings` is read from the environment (after `.env` is loaded by the
//! binaries). `EngineConfig` holds the tunables the engine itself uses.

use crate::error::AdvisorError;
use crate::predictor::rules::DEFAULT_EMERGENCY_MULTIPLIER;
use crate::Result;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MATERIALITY_THRESHOLD: f64 = 0.05;
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Joint-basis fractions at or below this are suppressed
    pub materiality_threshold: f64,
    /// Confidence reported when a predictor publishes none
    pub default_confidence: f64,
    /// Cap on the rule-based emergency fund as a share of surplus
    pub emergency_multiplier: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            materiality_threshold: DEFAULT_MATERIALITY_THRESHOLD,
            default_confidence: DEFAULT_CONFIDENCE,
            emergency_multiplier: DEFAULT_EMERGENCY_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub model_path: Option<PathBuf>,
    pub engine: EngineConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AdvisorError::Config(format!("invalid port '{}'", raw)))?,
            None => DEFAULT_PORT,
        };

        let model_path = lookup("ADVISOR_MODEL_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let emergency_multiplier = match lookup("ADVISOR_EMERGENCY_MULTIPLIER") {
            Some(raw) => {
                let value: f64 = raw.trim().parse().map_err(|_| {
                    AdvisorError::Config(format!("invalid emergency multiplier '{}'", raw))
                })?;
                if !(value > 0.0 && value <= 1.0) {
                    return Err(AdvisorError::Config(format!(
                        "emergency multiplier {} must be in (0, 1]",
                        value
                    )));
                }
                value
            }
            None => DEFAULT_EMERGENCY_MULTIPLIER,
        };

        Ok(Self {
            port,
            model_path,
            engine: EngineConfig {
                emergency_multiplier,
                ..EngineConfig::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.port, 8080);
        assert!(s.model_path.is_none());
        assert_eq!(s.engine, EngineConfig::default());
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("API_PORT", "9000"),
            ("ADVISOR_MODEL_PATH", "assets/linear_allocator.json"),
            ("ADVISOR_EMERGENCY_MULTIPLIER", "0.4"),
        ])
        .unwrap();

        assert_eq!(s.port, 9000);
        assert_eq!(s.model_path, Some(PathBuf::from("assets/linear_allocator.json")));
        assert_eq!(s.engine.emergency_multiplier, 0.4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(settings(&[("PORT", "http")]).is_err());
        assert!(settings(&[("ADVISOR_EMERGENCY_MULTIPLIER", "1.5")]).is_err());
        assert!(settings(&[("ADVISOR_EMERGENCY_MULTIPLIER", "zero")]).is_err());
    }
}
