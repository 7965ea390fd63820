//! Scoring Module - ground-truth risk labels
//!
//! RiskScorer turns derived features into a risk score and the Low/Medium/High
//! and binary labels the classifiers are trained on.

pub mod label;
pub mod policy;
pub mod scorer;

pub use label::{BinaryRiskLabel, LabelEncoder, RiskLabel};
pub use policy::{PolicyParams, ScoringPolicy};
pub use scorer::{Normalization, ReferenceMaxima, RiskScorer, ScoredSample};
