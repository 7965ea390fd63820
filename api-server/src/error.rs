//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use rockfall_core::RockfallError;
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Request errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Model errors
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    // Upstream prediction service errors
    #[error("upstream error: {0}")]
    Upstream(String),

    // Generic errors
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ModelUnavailable(_) => {
                tracing::error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Binary model not loaded")
            }
            AppError::Upstream(_) => {
                tracing::warn!("{}", self);
                (StatusCode::SERVICE_UNAVAILABLE, "Failed to get latest data")
            }
            AppError::InternalError(_) => {
                tracing::error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<RockfallError> for AppError {
    fn from(err: RockfallError) -> Self {
        match err {
            e if e.is_input_error() => AppError::InvalidInput(e.to_string()),
            e @ RockfallError::MissingArtifact(_) => AppError::ModelUnavailable(e.to_string()),
            e => AppError::InternalError(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}
