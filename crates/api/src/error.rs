use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mangaka_pipeline::PipelineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// The work queue redelivers on any 5xx, so every pipeline failure maps to
/// 500; `retryable` in the body records whether a redelivery can help.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A run failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The request body is not a task payload. Not redelivered.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, retryable) = match &self {
            AppError::Pipeline(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PIPELINE_FAILED",
                err.to_string(),
                err.is_retryable(),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), false)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    true,
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
            "retryable": retryable,
        });

        (status, axum::Json(body)).into_response()
    }
}
