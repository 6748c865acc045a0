//! API Error Types
//!
//! Maps report failures onto HTTP responses. Discovery failures carry the
//! diagnostic context operators need to fix a base URL or credentials.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::dto::ErrorResponse;
use crate::discovery::sanitize_message;
use crate::report::ReportError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Report generation failed
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Report(ReportError::Input(_)) => (StatusCode::BAD_REQUEST, "INPUT_ERROR"),
            ApiError::Report(ReportError::Discovery(_)) => (StatusCode::BAD_GATEWAY, "DISCOVERY_FAILED"),
            ApiError::Report(ReportError::Internal(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "REPORT_FAILED")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let (details, tried_base_urls) = match &self {
            ApiError::Report(ReportError::Discovery(failure)) => (
                Some(failure.details.clone()),
                Some(failure.tried_base_urls.clone()),
            ),
            _ => (None, None),
        };

        let message = match &self {
            ApiError::Report(e) => e.to_string(),
            other => ReportError::Internal(sanitize_message(&other.to_string())).to_string(),
        };

        let body = ErrorResponse {
            message,
            details,
            tried_base_urls,
            code: code.to_string(),
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
