//! Dashboard aggregator
//!
//! Polls the prediction service and keeps a bounded history for the page.

use axum::{extract::State, response::Html, Json};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::AppState;

const DASHBOARD_HTML: &str = include_str!("../../static/index.html");

pub async fn page() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

/// Fetch one simulate-and-predict result, record it, return it
pub async fn latest(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let url = format!("{}/simulate-and-predict", state.config.prediction_service_url);

    let response = state
        .http
        .get(&url)
        .send()
        .await?
        .error_for_status()?;
    let data: Value = response.json().await?;

    if data.get("error").is_some() {
        return Err(AppError::Upstream(format!("{} returned an error payload", url)));
    }

    state.history.push(data.clone());
    Ok(Json(data))
}

pub async fn history(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.history.snapshot())
}
