//! Central Configuration Constants
//!
//! Single source of truth for pipeline defaults.
//! Environment variables override them at runtime.

use std::path::PathBuf;

/// Samples in a generated dataset
pub const DEFAULT_SAMPLES: usize = 350;

/// Seed for dataset generation and train/test splits
pub const DEFAULT_SEED: u64 = 42;

/// Seed used when relabelling with the rebalanced policy
pub const DEFAULT_REBALANCE_SEED: u64 = 123;

/// Held-out fraction for train/test split
pub const DEFAULT_TEST_RATIO: f64 = 0.3;

/// Top-class probability below which the multiclass override kicks in
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Binary probability above which an alert is raised
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.5;

/// Mine identifier stamped on simulated readings
pub const DEFAULT_MINE_ID: &str = "MINE_001";

/// Dataset file name
pub const DATASET_FILE: &str = "rockfall_synthetic_dataset.csv";

/// Artifact file names inside the model directory
pub const BINARY_MODEL_FILE: &str = "rockfall_binary_model.json";
pub const MULTICLASS_MODEL_FILE: &str = "rockfall_multiclass_model.json";
pub const LABEL_ENCODER_FILE: &str = "rockfall_label_encoder.json";

/// Preferred sub-directory for selected models
pub const BEST_MODELS_DIR: &str = "best_models";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Base data directory (`<local data>/rockfall`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rockfall")
}

/// Model directory from environment or default
pub fn get_model_dir() -> PathBuf {
    std::env::var("ROCKFALL_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_data_dir().join("models"))
}

/// Dataset path from environment or default
pub fn get_dataset_path() -> PathBuf {
    std::env::var("ROCKFALL_DATASET_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_data_dir().join(DATASET_FILE))
}

/// Scoring policy name from environment ("initial" | "rebalanced")
pub fn get_scoring_policy() -> Option<String> {
    std::env::var("ROCKFALL_SCORING_POLICY").ok()
}

/// Confidence threshold from environment or default
pub fn get_confidence_threshold() -> f64 {
    std::env::var("ROCKFALL_CONFIDENCE_THRESHOLD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD)
}

/// Check if the low-confidence override is enabled
pub fn is_confidence_override_enabled() -> bool {
    std::env::var("ROCKFALL_CONFIDENCE_OVERRIDE")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}
