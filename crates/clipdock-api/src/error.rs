use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use clipdock_core::AppError;

/// Wire shape of every error this service returns.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

/// Newtype so [`AppError`] can implement [`IntoResponse`] in this crate.
/// Handlers return `Result<_, HttpAppError>` and let `?` do the conversion.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        Self(AppError::InvalidInput(format!(
            "malformed multipart body: {err}"
        )))
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        Self(AppError::Internal(err.to_string()))
    }
}

impl HttpAppError {
    /// Client errors carry their real message; server errors get a fixed
    /// message per stage so internals never leak into responses.
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            AppError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::PayloadTooLarge { .. } => (StatusCode::BAD_REQUEST, self.0.to_string()),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.clone()),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error".into()),
            AppError::Staging(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to stage upload".into(),
            ),
            AppError::Probe(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read video metadata".into(),
            ),
            AppError::Rewrite(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to prepare video for streaming".into(),
            ),
            AppError::Placement(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store video".into(),
            ),
            AppError::OrphanedAsset { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update video record".into(),
            ),
            AppError::Io(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".into(),
            ),
        }
    }

    fn log_error(&self) {
        match &self.0 {
            AppError::Unauthorized(message) => {
                tracing::warn!(error = %message, "unauthorized request")
            }
            AppError::OrphanedAsset { key, message } => {
                tracing::error!(storage.key = %key, error = %message, "record update failed after placement")
            }
            err if err.is_client_error() => tracing::debug!(error = %err, "request rejected"),
            err => tracing::error!(error = %err, "request failed"),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        self.log_error();
        let (status, message) = self.status_and_message();
        let body = ErrorResponse {
            error: message,
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}
