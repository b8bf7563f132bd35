//! REST API Server for the investment advisor
//!
//! Thin HTTP boundary over the recommendation engine

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::catalog::{all_options, current_rates, investment_option};
use crate::engine::RecommendationEngine;
use crate::models::InvestmentType;

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<RecommendationEngine>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "predictor": state.engine.variant(),
        "model_loaded": state.engine.model_available(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Recommendation Endpoint
/// =============================

async fn recommend(
    State(state): State<ApiState>,
    Json(req): Json<Value>,
) -> (StatusCode, Json<ApiResponse>) {
    info!("Received recommendation request");

    match state.engine.recommend(&req) {
        Ok(result) => (StatusCode::OK, Json(ApiResponse::success(result))),
        Err(e) if e.is_validation() => {
            warn!(error = %e, "Rejected profile");
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string())))
        }
        Err(e) => {
            warn!(error = %e, "Recommendation request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Internal error".to_string())),
            )
        }
    }
}

/// =============================
/// Reference Data
/// =============================

async fn model_info(State(state): State<ApiState>) -> (StatusCode, Json<ApiResponse>) {
    match state.engine.model_metadata() {
        Some(metadata) => {
            let data = serde_json::json!({
                "available": state.engine.model_available(),
                "model": metadata.as_ref(),
                "feature_count": metadata.feature_names.len(),
            });
            (StatusCode::OK, Json(ApiResponse::success(data)))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(
                "No model loaded; rule-based allocation in use".to_string(),
            )),
        ),
    }
}

async fn list_options() -> Json<ApiResponse> {
    Json(ApiResponse::success(all_options()))
}

async fn option_detail(Path(investment_type): Path<String>) -> (StatusCode, Json<ApiResponse>) {
    match InvestmentType::parse(&investment_type) {
        Some(t) => (
            StatusCode::OK,
            Json(ApiResponse::success(investment_option(t))),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!(
                "Unknown investment type '{}'",
                investment_type
            ))),
        ),
    }
}

async fn rates() -> Json<ApiResponse> {
    Json(ApiResponse::success(current_rates()))
}

/// =============================
/// Router
/// =============================

pub fn create_router(engine: Arc<RecommendationEngine>) -> Router {
    let state = ApiState { engine };

    Router::new()
        .route("/health", get(health))
        .route("/api/recommendations", post(recommend))
        .route("/api/model_info", get(model_info))
        .route("/api/investment_options", get(list_options))
        .route("/api/investment_options/:investment_type", get(option_detail))
        .route("/api/rates", get(rates))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    engine: Arc<RecommendationEngine>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(engine);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
