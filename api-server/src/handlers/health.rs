//! Health check handlers

use axum::{extract::State, Json};
use rockfall_core::logic::features::LayoutInfo;

use crate::models::{HealthResponse, HomeResponse};
use crate::AppState;

pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "API is running".to_string(),
    })
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let models = state.registry.status();
    let status = if models.binary_model.loaded { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        models,
        feature_layout: LayoutInfo::current(),
    })
}
