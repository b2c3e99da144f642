use crate::config::ConfigError;
use crate::packs::PackError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("pack error: {0}")]
    Pack(#[from] PackError),
    #[error("{failed} of {total} pack(s) failed validation")]
    PacksInvalid { failed: usize, total: usize },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Pack(PackError::InvalidIdentifier(_)) => StatusCode::BAD_REQUEST,
            AppError::Pack(PackError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Pack(
                PackError::ConfigMismatch { .. } | PackError::ValidationFailure { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Pack(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::PacksInvalid { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Pack(PackError::ValidationFailure { violations }) => Json(json!({
                "error": self.to_string(),
                "violations": violations,
            })),
            _ => Json(json!({ "error": self.to_string() })),
        };
        (status, body).into_response()
    }
}
