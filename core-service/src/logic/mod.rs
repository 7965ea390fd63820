//! Logic Module - Rockfall Risk Pipeline
//!
//! Chứa các thành phần: feature engineering, sinh dữ liệu, chấm điểm rủi ro,
//! classifiers, response builder, dataset và training.
//!
//! ## Architecture
//! - `features/` - Raw inputs → derived features → versioned vector
//! - `generator/` - Synthetic sensor samples
//! - `scoring/` - Rule-based risk score, policies, labels
//! - `model/` - Classifiers, artifact registry, inference adapter
//! - `response/` - Risk ladders and caller-facing responses
//! - `dataset/` - Build, relabel, store and split datasets
//! - `training/` - Candidate training and model selection

pub mod config;

pub mod features;
pub mod generator;
pub mod scoring;
pub mod model;
pub mod response;
pub mod dataset;
pub mod training;
