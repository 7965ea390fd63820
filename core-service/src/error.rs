//! Error taxonomy for the rockfall pipeline
//!
//! Validation errors surface straight to the caller. `MissingArtifact` is only
//! fatal on the binary path; the multiclass path degrades instead (see
//! `logic::model::adapter`).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RockfallError>;

#[derive(Debug, Error)]
pub enum RockfallError {
    /// Model or encoder artifact is not loaded / not loadable
    #[error("artifact not available: {0}")]
    MissingArtifact(String),

    /// Non-numeric or out-of-domain raw field
    #[error("invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// Required raw field absent under the strict field policy
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// Degenerate geometry (division by zero, undefined tangent)
    #[error("undefined computation for '{feature}': {reason}")]
    UndefinedComputation { feature: &'static str, reason: String },

    /// Batch-max normalization requested without a real batch
    #[error("normalization ambiguity: {0}")]
    NormalizationAmbiguity(String),

    /// Artifact trained on a different feature layout
    #[error(
        "feature layout mismatch: expected v{expected_version} ({expected_hash:08x}), got v{actual_version} ({actual_hash:08x})"
    )]
    LayoutMismatch {
        expected_version: u8,
        expected_hash: u32,
        actual_version: u8,
        actual_hash: u32,
    },

    /// Classifier misuse (not fitted, shape mismatch, empty training set)
    #[error("model error: {0}")]
    Model(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RockfallError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RockfallError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn undefined(feature: &'static str, reason: impl Into<String>) -> Self {
        RockfallError::UndefinedComputation {
            feature,
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's payload
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RockfallError::InvalidInput { .. }
                | RockfallError::MissingField(_)
                | RockfallError::UndefinedComputation { .. }
        )
    }
}
