//! Training Module - candidate fitting, selection and reporting

pub mod report;
pub mod trainer;

pub use report::{CandidateScore, FeatureImportance, TaskReport, TrainingReport};
pub use trainer::{save_outcome, train_all, SavedArtifacts, TrainingConfig, TrainingOutcome};
