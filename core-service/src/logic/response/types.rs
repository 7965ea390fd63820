//! Response Types
//!
//! Wire shapes returned by the prediction surfaces.

use serde::{Deserialize, Serialize};

use super::ladder::AlertLevel;

/// Label reported when the multiclass path is unavailable
pub const UNAVAILABLE_LABEL: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryResponse {
    /// 0 or 1
    pub prediction: u8,
    pub risk_level: AlertLevel,
    /// Probability of rockfall
    pub confidence: f64,
    pub recommendation: String,
    pub alert_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MulticlassResponse {
    pub prediction_label: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_encoded: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub probabilities: Vec<f64>,
}

impl MulticlassResponse {
    /// `{prediction_label: "N/A", confidence: 0.0}`
    pub fn unavailable() -> Self {
        Self {
            prediction_label: UNAVAILABLE_LABEL.to_string(),
            confidence: 0.0,
            prediction_encoded: None,
            probabilities: Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.prediction_label != UNAVAILABLE_LABEL
    }
}

/// Binary and multiclass results for one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedPrediction {
    pub binary_result: BinaryResponse,
    pub multiclass_result: MulticlassResponse,
}
