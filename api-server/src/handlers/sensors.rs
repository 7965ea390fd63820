//! Simulated sensor feed

use axum::{extract::State, Json};
use rockfall_core::logic::generator::{SampleGenerator, SamplingProfile, SensorReading};

use crate::AppState;

/// One reading from the narrower sensor-feed ranges
pub async fn simulate(State(state): State<AppState>) -> Json<SensorReading> {
    let mut generator = SampleGenerator::from_entropy(SamplingProfile::sensor_feed());
    Json(generator.sensor_reading(&state.config.mine_id))
}
