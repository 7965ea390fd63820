//! Configuration module

use std::env;
use std::path::PathBuf;

use rockfall_core::constants::{get_model_dir, DEFAULT_MINE_ID};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Directory holding the model artifacts
    pub model_dir: PathBuf,

    /// Base URL of the prediction service polled by `/api/latest`
    pub prediction_service_url: String,

    /// Dashboard history size
    pub history_capacity: usize,

    /// Timeout for the dashboard's upstream call, in seconds
    pub upstream_timeout_secs: u64,

    /// Mine identifier stamped on simulated readings
    pub mine_id: String,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            model_dir: get_model_dir(),
            prediction_service_url: "http://localhost:5000".to_string(),
            history_capacity: 50,
            upstream_timeout_secs: 5,
            mine_id: DEFAULT_MINE_ID.to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_dir: env::var("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),

            prediction_service_url: env::var("PREDICTION_SERVICE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.prediction_service_url),

            history_capacity: env::var("HISTORY_CAPACITY")
                .ok()
                .and_then(|c| c.parse().ok())
                .filter(|&c| c > 0)
                .unwrap_or(defaults.history_capacity),

            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.upstream_timeout_secs),

            mine_id: env::var("MINE_ID").unwrap_or(defaults.mine_id),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }
}
