//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; any `AppError` converts
//! with `?` and renders as an [`ErrorResponse`] with the status and code from its
//! `ErrorMetadata`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use intake_core::{AppError, ErrorMetadata, LogLevel};
pub use intake_infra::ErrorResponse;
use std::sync::LazyLock;

static IS_PRODUCTION: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| {
            let env = env.to_lowercase();
            env == "production" || env == "prod"
        })
        .unwrap_or(false)
});

/// Wrapper type for AppError to implement IntoResponse
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let reason = error.rejection_reason().map(|r| r.as_str());
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, reason, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, reason, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, reason, "Request failed");
        }
    }
}

/// Body for `error`; details are withheld in production and for sensitive errors.
pub fn error_body(error: &AppError, show_details: bool) -> ErrorResponse {
    let show_details = show_details && !error.is_sensitive();
    ErrorResponse {
        error: error.client_message(),
        details: show_details.then(|| error.detailed_message()),
        error_type: show_details.then(|| error.error_type().to_string()),
        code: error.error_code().to_string(),
        recoverable: error.is_recoverable(),
        suggested_action: error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(error_body(app_error, !*IS_PRODUCTION))).into_response()
    }
}
