//! Prediction handlers

use axum::{body::Bytes, extract::State, Json};
use rockfall_core::logic::features::{FeatureVector, FieldPolicy};
use rockfall_core::logic::generator::{SampleGenerator, SamplingProfile};
use rockfall_core::logic::response::BinaryResponse;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::models::{PredictRockfallResponse, SimulateAndPredictResponse};
use crate::AppState;

/// Body must be a non-empty JSON object
fn parse_payload(body: &[u8]) -> AppResult<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::InvalidInput("No input data provided".to_string()));
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        Ok(Value::Object(_)) => Err(AppError::InvalidInput("No input data provided".to_string())),
        Ok(_) => Err(AppError::InvalidInput("Input must be a JSON object".to_string())),
        Err(e) => Err(AppError::InvalidInput(format!("Invalid JSON: {}", e))),
    }
}

/// Binary + multiclass, sensitive profile
pub async fn predict_rockfall(State(state): State<AppState>, body: Bytes) -> AppResult<Json<PredictRockfallResponse>> {
    let payload = parse_payload(&body)?;
    let vector = FeatureVector::from_payload(&payload, FieldPolicy::WithDefaults)?;
    tracing::debug!(features = %vector.to_log_entry(), "Prediction input");

    let prediction = state.sensitive.predict(&state.classifier, &vector)?;
    tracing::debug!(
        risk_level = prediction.binary_result.risk_level.as_str(),
        confidence = prediction.binary_result.confidence,
        "predict-rockfall"
    );

    Ok(Json(PredictRockfallResponse::new(prediction, chrono::Utc::now().to_rfc3339())))
}

/// Binary only, conservative profile
pub async fn predict(State(state): State<AppState>, body: Bytes) -> AppResult<Json<BinaryResponse>> {
    let payload = parse_payload(&body)?;
    let vector = FeatureVector::from_payload(&payload, FieldPolicy::WithDefaults)?;
    tracing::debug!(features = %vector.to_log_entry(), "Prediction input");

    let binary = state.classifier.predict_binary(&vector)?;
    Ok(Json(state.conservative.binary(&binary)))
}

/// Fresh live reading run through both models
pub async fn simulate_and_predict(State(state): State<AppState>) -> AppResult<Json<SimulateAndPredictResponse>> {
    if !state.registry.has_binary() {
        return Err(AppError::ModelUnavailable("binary model not loaded".to_string()));
    }

    let mut generator = SampleGenerator::from_entropy(SamplingProfile::live());
    let reading = generator.sensor_reading(&state.config.mine_id);
    let vector = FeatureVector::from_raw(&reading.features)
        .map_err(|e| AppError::InternalError(format!("Feature calculation failed: {}", e)))?;

    let prediction = state.sensitive.predict(&state.classifier, &vector)?;

    Ok(Json(SimulateAndPredictResponse {
        sensor_data: reading,
        prediction,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
