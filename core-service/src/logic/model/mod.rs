//! Model Module - classifiers, artifacts and inference
//!
//! Training produces `TrainedModel` artifacts; the registry loads them and the
//! `RiskClassifier` adapter serves predictions from it.

pub mod classifier;
pub mod forest;
pub mod logistic;
pub mod knn;
pub mod scaler;
pub mod metrics;
pub mod registry;
pub mod adapter;

// Re-export common types
pub use classifier::{Classifier, ClassifierKind, Estimator, TrainedModel};
pub use forest::{ForestConfig, RandomForest};
pub use logistic::LogisticRegression;
pub use knn::KnnClassifier;
pub use scaler::StandardScaler;
pub use registry::{ArtifactInfo, ArtifactKind, ArtifactState, ModelRegistry, RegistryStatus};
pub use adapter::{BinaryPrediction, ConfidenceOverride, MulticlassOutcome, RiskClassifier};
