//! Error types module
//!
//! All failures that can cross a component boundary are unified under `AppError`.
//! Fatal ingestion outcomes have dedicated variants so the HTTP layer and the audit
//! trail can report a stable reason code instead of a free-form message.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use serde::{Deserialize, Serialize};
use std::io;
use utoipa::ToSchema;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected uploads and recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "MALWARE_DETECTED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Stable reason code attached to every rejected ingestion or delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    InvalidType,
    PayloadTooLarge,
    Unauthenticated,
    ScannerUnavailable,
    Infected,
    SanitizeFailure,
    ExtractFailure,
    PersistenceFailure,
    NotFound,
    Forbidden,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::InvalidType => "invalid_type",
            RejectionReason::PayloadTooLarge => "payload_too_large",
            RejectionReason::Unauthenticated => "unauthenticated",
            RejectionReason::ScannerUnavailable => "scanner_unavailable",
            RejectionReason::Infected => "infected",
            RejectionReason::SanitizeFailure => "sanitize_failure",
            RejectionReason::ExtractFailure => "extract_failure",
            RejectionReason::PersistenceFailure => "persistence_failure",
            RejectionReason::NotFound => "not_found",
            RejectionReason::Forbidden => "forbidden",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid file type: {0}")]
    InvalidType(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Malware detected: {0}")]
    Infected(String),

    #[error("Malware scanner unavailable: {0}")]
    ScannerUnavailable(String),

    #[error("Sanitization failed: {0}")]
    SanitizeFailure(String),

    #[error("Extraction failed for {file}: {cause}")]
    ExtractFailure { file: String, cause: String },

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidType(_) => (
            415,
            "INVALID_TYPE",
            false,
            Some("Upload a file whose extension matches the declared source type"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Authenticate before uploading or deleting sources"),
            false,
            LogLevel::Debug,
        ),
        AppError::Infected(_) => (
            422,
            "MALWARE_DETECTED",
            false,
            Some("Do not resubmit this file"),
            false,
            LogLevel::Warn,
        ),
        AppError::ScannerUnavailable(_) => (
            503,
            "SCANNER_UNAVAILABLE",
            true,
            Some("Retry once the malware scanner is reachable"),
            true,
            LogLevel::Error,
        ),
        AppError::SanitizeFailure(_) => (
            422,
            "SANITIZE_FAILED",
            false,
            Some("Check the file is not corrupted and try a different file"),
            false,
            LogLevel::Warn,
        ),
        AppError::ExtractFailure { .. } => (
            422,
            "EXTRACT_FAILED",
            false,
            Some("Check the file is not corrupted and try a different file"),
            false,
            LogLevel::Warn,
        ),
        AppError::Persistence(_) => (
            500,
            "PERSISTENCE_FAILED",
            true,
            Some("Resubmit the upload"),
            true,
            LogLevel::Error,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            None,
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::InvalidType(_) => "InvalidType",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Infected(_) => "Infected",
            AppError::ScannerUnavailable(_) => "ScannerUnavailable",
            AppError::SanitizeFailure(_) => "SanitizeFailure",
            AppError::ExtractFailure { .. } => "ExtractFailure",
            AppError::Persistence(_) => "PersistenceFailure",
            AppError::NotFound(_) => "NotFound",
            AppError::Forbidden(_) => "Forbidden",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Reason code for errors that represent a rejected ingestion or delete request.
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self {
            AppError::InvalidType(_) => Some(RejectionReason::InvalidType),
            AppError::PayloadTooLarge(_) => Some(RejectionReason::PayloadTooLarge),
            AppError::Unauthorized(_) => Some(RejectionReason::Unauthenticated),
            AppError::Infected(_) => Some(RejectionReason::Infected),
            AppError::ScannerUnavailable(_) => Some(RejectionReason::ScannerUnavailable),
            AppError::SanitizeFailure(_) => Some(RejectionReason::SanitizeFailure),
            AppError::ExtractFailure { .. } => Some(RejectionReason::ExtractFailure),
            AppError::Persistence(_) => Some(RejectionReason::PersistenceFailure),
            AppError::NotFound(_) => Some(RejectionReason::NotFound),
            AppError::Forbidden(_) => Some(RejectionReason::Forbidden),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::InvalidType(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Infected(_) => "Upload blocked: malware detected in file".to_string(),
            AppError::ScannerUnavailable(_) => {
                "Upload rejected: malware scanner is unavailable".to_string()
            }
            AppError::SanitizeFailure(ref msg) => msg.clone(),
            AppError::ExtractFailure { ref file, .. } => {
                format!("Could not extract data from {}", file)
            }
            AppError::Persistence(_) => "Failed to save upload".to_string(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
