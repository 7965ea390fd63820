//! Pipeline Configuration
//!
//! Defaults come from `constants`; a JSON file or the `ROCKFALL_*` environment
//! variables override them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    get_confidence_threshold, get_dataset_path, get_model_dir, get_scoring_policy,
    is_confidence_override_enabled, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_REBALANCE_SEED, DEFAULT_SAMPLES,
    DEFAULT_SEED,
};
use crate::error::{Result, RockfallError};
use crate::logic::model::ConfidenceOverride;
use crate::logic::scoring::ScoringPolicy;
use crate::logic::training::TrainingConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub model_dir: PathBuf,
    pub dataset_path: PathBuf,
    pub samples: usize,
    pub seed: u64,
    pub rebalance_seed: u64,
    pub scoring_policy: ScoringPolicy,
    pub confidence_override: bool,
    pub confidence_threshold: f64,
    pub training: TrainingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_dir: get_model_dir(),
            dataset_path: get_dataset_path(),
            samples: DEFAULT_SAMPLES,
            seed: DEFAULT_SEED,
            rebalance_seed: DEFAULT_REBALANCE_SEED,
            scoring_policy: ScoringPolicy::default(),
            confidence_override: true,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            training: TrainingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(policy) = get_scoring_policy() {
            self.scoring_policy = policy.parse()?;
        }
        self.confidence_override = is_confidence_override_enabled();
        self.confidence_threshold = get_confidence_threshold();
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(RockfallError::invalid(
                "confidence_threshold",
                format!("{} is not in [0, 1]", self.confidence_threshold),
            ));
        }
        if !(self.training.test_ratio > 0.0 && self.training.test_ratio < 1.0) {
            return Err(RockfallError::invalid(
                "training.test_ratio",
                format!("{} is not in (0, 1)", self.training.test_ratio),
            ));
        }
        if self.samples < 2 {
            return Err(RockfallError::invalid("samples", "need at least 2 samples"));
        }
        Ok(())
    }

    pub fn confidence_override(&self) -> ConfidenceOverride {
        ConfidenceOverride {
            enabled: self.confidence_override,
            threshold: self.confidence_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.samples, 350);
        assert_eq!(config.rebalance_seed, 123);
        assert_eq!(config.training.test_ratio, 0.3);
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, r#"{"samples": 500, "scoring_policy": "rebalanced"}"#).unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.samples, 500);
        assert_eq!(config.scoring_policy, ScoringPolicy::Rebalanced);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_from_file_rejects_bad_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, r#"{"confidence_threshold": 1.5}"#).unwrap();

        assert!(PipelineConfig::from_file(&path).is_err());
    }
}
