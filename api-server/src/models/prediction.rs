//! Prediction API payloads

use rockfall_core::logic::features::LayoutInfo;
use rockfall_core::logic::generator::SensorReading;
use rockfall_core::logic::model::RegistryStatus;
use rockfall_core::logic::response::{BinaryResponse, CombinedPrediction, MulticlassResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: i64,
    pub models: RegistryStatus,
    pub feature_layout: LayoutInfo,
}

/// `POST /predict-rockfall`
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRockfallResponse {
    pub binary_result: BinaryResponse,
    pub multiclass_result: MulticlassResponse,
    pub timestamp: String,
}

impl PredictRockfallResponse {
    pub fn new(prediction: CombinedPrediction, timestamp: String) -> Self {
        Self {
            binary_result: prediction.binary_result,
            multiclass_result: prediction.multiclass_result,
            timestamp,
        }
    }
}

/// `GET /simulate-and-predict`
#[derive(Debug, Serialize, Deserialize)]
pub struct SimulateAndPredictResponse {
    pub sensor_data: SensorReading,
    pub prediction: CombinedPrediction,
    pub timestamp: String,
}
