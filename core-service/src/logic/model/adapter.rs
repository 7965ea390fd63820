//! Risk Classifier Adapter
//!
//! Inference entry point over an injected `ModelRegistry`. The binary path is
//! hard-required; the multiclass path degrades to `Unavailable` instead of
//! failing the request.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::classifier::{argmax, TrainedModel};
use super::registry::ModelRegistry;
use crate::constants::{get_confidence_threshold, is_confidence_override_enabled, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::error::{Result, RockfallError};
use crate::logic::features::FeatureVector;
use crate::logic::scoring::{BinaryRiskLabel, LabelEncoder, RiskLabel};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryPrediction {
    pub label: BinaryRiskLabel,
    /// Probability of class 1 (rockfall)
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MulticlassOutcome {
    Available {
        label: RiskLabel,
        encoded: usize,
        /// Top class probability, whatever class is reported
        confidence: f64,
        /// In label-encoder order
        probabilities: Vec<f64>,
        overridden: bool,
    },
    Unavailable {
        reason: String,
    },
}

impl MulticlassOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, MulticlassOutcome::Available { .. })
    }
}

/// Low-confidence multiclass predictions report a neighbouring class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceOverride {
    pub enabled: bool,
    pub threshold: f64,
}

impl Default for ConfidenceOverride {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl ConfidenceOverride {
    pub fn disabled() -> Self {
        Self { enabled: false, ..Default::default() }
    }

    /// `ROCKFALL_CONFIDENCE_OVERRIDE` / `ROCKFALL_CONFIDENCE_THRESHOLD`
    pub fn from_env() -> Self {
        Self {
            enabled: is_confidence_override_enabled(),
            threshold: get_confidence_threshold(),
        }
    }

    /// Reported index for a prediction of `index` with top probability `confidence`
    pub fn apply<R: Rng + ?Sized>(&self, index: usize, confidence: f64, n_classes: usize, rng: &mut R) -> usize {
        if !self.enabled || n_classes < 2 || confidence >= self.threshold {
            return index;
        }
        if rng.gen_bool(0.5) {
            (index + 1) % n_classes
        } else {
            (index + n_classes - 1) % n_classes
        }
    }
}

pub struct RiskClassifier {
    registry: Arc<ModelRegistry>,
    confidence_override: ConfidenceOverride,
}

impl RiskClassifier {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            confidence_override: ConfidenceOverride::default(),
        }
    }

    pub fn with_override(mut self, confidence_override: ConfidenceOverride) -> Self {
        self.confidence_override = confidence_override;
        self
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// `MissingArtifact` when the binary model is not loaded
    pub fn predict_binary(&self, vector: &FeatureVector) -> Result<BinaryPrediction> {
        let model = self.registry.binary()?;
        let probs = model.predict_vector(vector)?;
        let class = argmax(ndarray::ArrayView1::from(&probs[..]));

        let label = BinaryRiskLabel::try_from(class as u8).map_err(RockfallError::Model)?;
        let probability = probs.get(1).copied().unwrap_or(0.0);

        Ok(BinaryPrediction { label, probability })
    }

    pub fn predict_multiclass(&self, vector: &FeatureVector) -> MulticlassOutcome {
        self.predict_multiclass_with_rng(vector, &mut rand::thread_rng())
    }

    /// Never fails; problems become `Unavailable`
    pub fn predict_multiclass_with_rng<R: Rng + ?Sized>(&self, vector: &FeatureVector, rng: &mut R) -> MulticlassOutcome {
        let (Some(model), Some(encoder)) = (self.registry.multiclass(), self.registry.label_encoder()) else {
            return MulticlassOutcome::Unavailable {
                reason: "multiclass model or label encoder not loaded".to_string(),
            };
        };

        match self.multiclass(&model, &encoder, vector, rng) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Multiclass prediction failed: {}", e);
                MulticlassOutcome::Unavailable { reason: e.to_string() }
            }
        }
    }

    fn multiclass<R: Rng + ?Sized>(
        &self,
        model: &TrainedModel,
        encoder: &LabelEncoder,
        vector: &FeatureVector,
        rng: &mut R,
    ) -> Result<MulticlassOutcome> {
        if model.n_classes() != encoder.n_classes() {
            return Err(RockfallError::Model(format!(
                "model has {} classes, encoder has {}",
                model.n_classes(),
                encoder.n_classes()
            )));
        }

        let probabilities = model.predict_vector(vector)?;
        let predicted = argmax(ndarray::ArrayView1::from(&probabilities[..]));
        let confidence = probabilities.get(predicted).copied().unwrap_or(0.0);

        let encoded = self.confidence_override.apply(predicted, confidence, probabilities.len(), rng);
        if encoded != predicted {
            log::debug!("Low confidence {:.3}: reporting class {} instead of {}", confidence, encoded, predicted);
        }

        Ok(MulticlassOutcome::Available {
            label: encoder.decode(encoded)?,
            encoded,
            confidence,
            probabilities,
            overridden: encoded != predicted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{LayoutStamp, RawFeatures, FEATURE_COUNT};
    use crate::logic::model::{Classifier, Estimator, KnnClassifier};
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_vector() -> FeatureVector {
        let raw = RawFeatures::from_values([
            80.0, 45.0, 15.0, 30.0, 25.0, 60.0, 1.5, 10.0, 15.0, 10.0, 5.0, 100.0, 3.0, 7.0, 50.0, 5.0, 1.0,
        ])
        .unwrap();
        FeatureVector::from_raw(&raw).unwrap()
    }

    /// Model that always predicts `class` with certainty
    fn constant_model(n_classes: usize, class: usize) -> TrainedModel {
        vote_model(n_classes, &[class])
    }

    /// k-NN over identical rows: probabilities are the label fractions
    fn vote_model(n_classes: usize, labels: &[usize]) -> TrainedModel {
        let mut knn = KnnClassifier::new(labels.len(), n_classes);
        knn.fit(&Array2::zeros((labels.len(), FEATURE_COUNT)), labels).unwrap();
        TrainedModel {
            layout: LayoutStamp::current(),
            scaler: None,
            estimator: Estimator::Knn(knn),
            trained_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_binary_requires_model() {
        let classifier = RiskClassifier::new(Arc::new(ModelRegistry::new()));
        let err = classifier.predict_binary(&sample_vector()).unwrap_err();
        assert!(matches!(err, RockfallError::MissingArtifact(_)));
    }

    #[test]
    fn test_binary_prediction() {
        let registry = Arc::new(ModelRegistry::new());
        registry.install_binary(constant_model(2, 1)).unwrap();
        let prediction = RiskClassifier::new(registry).predict_binary(&sample_vector()).unwrap();

        assert_eq!(prediction.label, BinaryRiskLabel::Rockfall);
        assert_eq!(prediction.probability, 1.0);
    }

    #[test]
    fn test_multiclass_unavailable_without_encoder() {
        let registry = Arc::new(ModelRegistry::new());
        registry.install_multiclass(constant_model(3, 0)).unwrap();
        let outcome = RiskClassifier::new(registry).predict_multiclass(&sample_vector());
        assert!(!outcome.is_available());
    }

    #[test]
    fn test_multiclass_confident_prediction_is_kept() {
        let registry = Arc::new(ModelRegistry::new());
        registry.install_multiclass(constant_model(3, 0)).unwrap();
        registry.install_label_encoder(LabelEncoder::standard()).unwrap();

        let outcome = RiskClassifier::new(registry).predict_multiclass(&sample_vector());
        match outcome {
            MulticlassOutcome::Available { label, encoded, confidence, overridden, .. } => {
                assert_eq!(encoded, 0);
                assert_eq!(label, RiskLabel::High);
                assert_eq!(confidence, 1.0);
                assert!(!overridden);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_override_picks_adjacent_class() {
        let rule = ConfidenceOverride::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let reported = rule.apply(1, 0.45, 3, &mut rng);
            assert!(reported == 0 || reported == 2);
            let wrapped = rule.apply(0, 0.2, 3, &mut rng);
            assert!(wrapped == 1 || wrapped == 2);
        }
        assert_eq!(rule.apply(1, 0.5, 3, &mut rng), 1);
        assert_eq!(ConfidenceOverride::disabled().apply(1, 0.1, 3, &mut rng), 1);
    }

    #[test]
    fn test_low_confidence_multiclass_reports_neighbour() {
        let registry = Arc::new(ModelRegistry::new());
        // 3/7 for class 1, 2/7 for classes 0 and 2
        registry.install_multiclass(vote_model(3, &[1, 1, 1, 0, 0, 2, 2])).unwrap();
        registry.install_label_encoder(LabelEncoder::standard()).unwrap();
        let classifier = RiskClassifier::new(registry);

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            match classifier.predict_multiclass_with_rng(&sample_vector(), &mut rng) {
                MulticlassOutcome::Available { label, encoded, confidence, probabilities, overridden } => {
                    assert!(overridden);
                    assert!(encoded == 0 || encoded == 2, "reported {}", encoded);
                    assert_eq!(label, LabelEncoder::standard().decode(encoded).unwrap());
                    assert!((confidence - 3.0 / 7.0).abs() < 1e-12);
                    assert_eq!(probabilities.len(), 3);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }
}
