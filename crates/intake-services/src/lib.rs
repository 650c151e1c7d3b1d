//! Intake Services Library
//!
//! Malware scanning backends, the audit logger and the ingestion orchestrator that
//! ties storage, scanning, sanitization, extraction and persistence together.

pub mod audit;
pub mod ingestion;
pub mod scanner;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types
pub use audit::AuditLogger;
pub use ingestion::{
    IngestionPolicy, IngestionReceipt, IngestionService, UploadRequest, UploadedFile,
};
pub use scanner::{scanner_from_config, ClamScanCommand, DisabledScanner, Scanner};

#[cfg(feature = "clamav")]
pub use scanner::ClamdScanner;
