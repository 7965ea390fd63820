//! Prediction Response Builder
//!
//! Turns adapter outputs into caller-facing responses under a `ResponseProfile`.
//! The live API and the batch prediction surface use different ladders and
//! texts; both are kept as presets rather than merged.

use serde::{Deserialize, Serialize};

use super::ladder::{AlertLevel, RiskLadder};
use super::types::{BinaryResponse, CombinedPrediction, MulticlassResponse};
use crate::constants::DEFAULT_ALERT_THRESHOLD;
use crate::error::Result;
use crate::logic::features::FeatureVector;
use crate::logic::model::{BinaryPrediction, MulticlassOutcome, RiskClassifier};

/// Recommendation text per alert level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub low: String,
    pub medium: String,
    pub high: String,
    pub critical: String,
}

impl Recommendations {
    pub fn for_level(&self, level: AlertLevel) -> &str {
        match level {
            AlertLevel::Low => &self.low,
            AlertLevel::Medium => &self.medium,
            AlertLevel::High => &self.high,
            AlertLevel::Critical => &self.critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseProfile {
    pub name: String,
    pub ladder: RiskLadder,
    /// `alert_required = probability > alert_threshold`
    pub alert_threshold: f64,
    pub recommendations: Recommendations,
    /// Round reported confidences; None keeps full precision
    pub confidence_decimals: Option<u32>,
    pub include_color: bool,
}

impl ResponseProfile {
    /// Live API surface (`/predict-rockfall`, `/simulate-and-predict`)
    pub fn sensitive() -> Self {
        Self {
            name: "sensitive".to_string(),
            ladder: RiskLadder::SENSITIVE,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            recommendations: Recommendations {
                low: "Low risk. Continue operations.".to_string(),
                medium: "Moderate risk. Increase monitoring.".to_string(),
                high: "High risk detected. Consider evacuation.".to_string(),
                critical: "Immediate evacuation required.".to_string(),
            },
            confidence_decimals: Some(2),
            include_color: false,
        }
    }

    /// Batch prediction surface (`/predict`, CLI `predict`)
    pub fn conservative() -> Self {
        Self {
            name: "conservative".to_string(),
            ladder: RiskLadder::CONSERVATIVE,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            recommendations: Recommendations {
                low: "Low risk. Continue regular monitoring.".to_string(),
                medium: "Moderate risk. Increase monitoring.".to_string(),
                high: "High risk detected. Consider evacuation.".to_string(),
                critical: "Immediate evacuation required. Stop all operations.".to_string(),
            },
            confidence_decimals: None,
            include_color: true,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "sensitive" => Some(Self::sensitive()),
            "conservative" => Some(Self::conservative()),
            _ => None,
        }
    }

    fn round(&self, value: f64) -> f64 {
        match self.confidence_decimals {
            Some(d) => {
                let factor = 10f64.powi(d as i32);
                (value * factor).round() / factor
            }
            None => value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PredictionResponseBuilder {
    profile: ResponseProfile,
}

impl PredictionResponseBuilder {
    pub fn new(profile: ResponseProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ResponseProfile {
        &self.profile
    }

    pub fn binary(&self, prediction: &BinaryPrediction) -> BinaryResponse {
        let probability = prediction.probability;
        let level = self.profile.ladder.classify(probability);

        BinaryResponse {
            prediction: prediction.label.as_u8(),
            risk_level: level,
            confidence: self.profile.round(probability),
            recommendation: self.profile.recommendations.for_level(level).to_string(),
            alert_required: probability > self.profile.alert_threshold,
            color: self.profile.include_color.then(|| level.color().to_string()),
        }
    }

    pub fn multiclass(&self, outcome: &MulticlassOutcome) -> MulticlassResponse {
        match outcome {
            MulticlassOutcome::Available { label, encoded, confidence, probabilities, .. } => MulticlassResponse {
                prediction_label: label.to_string(),
                confidence: self.profile.round(*confidence),
                prediction_encoded: Some(*encoded),
                probabilities: probabilities.clone(),
            },
            MulticlassOutcome::Unavailable { .. } => MulticlassResponse::unavailable(),
        }
    }

    /// Both paths for one vector; fails only when the binary path fails
    pub fn predict(&self, classifier: &RiskClassifier, vector: &FeatureVector) -> Result<CombinedPrediction> {
        let binary = classifier.predict_binary(vector)?;
        let multiclass = classifier.predict_multiclass(vector);

        Ok(CombinedPrediction {
            binary_result: self.binary(&binary),
            multiclass_result: self.multiclass(&multiclass),
        })
    }
}
