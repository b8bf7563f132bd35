//! Investment Advisor
//!
//! Turns a personal financial profile into a prioritized plan for investing
//! the monthly surplus:
//! - Validates and coerces a flat profile mapping
//! - Derives an 11-feature vector including a bounded risk score
//! - Predicts allocations with a trained model or fixed rules
//! - Falls back to the rules whenever the model cannot answer
//!
//! PIPELINE:
//! VALIDATE → FEATURES → PREDICT → NORMALIZE → ASSEMBLE → SUMMARIZE

pub mod api;
pub mod assembler;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod models;
pub mod normalizer;
pub mod predictor;
pub mod summary;
pub mod validation;

pub use error::Result;

// Re-export common types
pub use engine::RecommendationEngine;
pub use models::*;
pub use predictor::{AllocationModel, AllocationPredictor, LinearModel};
