use bytes::Bytes;
use intake_core::models::{ExtractedData, Principal, RequestMeta, ScanOutcome, Source, Verdict};
use intake_core::Config;
use serde::Serialize;

/// File part of an upload as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }
}

/// One ingestion call: what the client sent plus who sent it and from where.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub declared_type: String,
    /// `None` when the request carried no file part
    pub file: Option<UploadedFile>,
    /// `None` for anonymous callers
    pub principal: Option<Principal>,
    pub meta: RequestMeta,
}

/// Limits and the scanner-unavailable policy applied to every upload.
#[derive(Debug, Clone, Copy)]
pub struct IngestionPolicy {
    pub max_upload_size_bytes: usize,
    /// Reject uploads whose scan verdict is `Unavailable` instead of accepting them
    pub scanner_fail_closed: bool,
}

impl IngestionPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_upload_size_bytes: config.max_upload_size_bytes(),
            scanner_fail_closed: config.scanner_fail_closed(),
        }
    }
}

impl Default for IngestionPolicy {
    fn default() -> Self {
        Self {
            max_upload_size_bytes: 50 * 1024 * 1024,
            scanner_fail_closed: false,
        }
    }
}

/// Result of an accepted upload.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReceipt {
    pub source: Source,
    pub extracted: ExtractedData,
    pub scan: ScanOutcome,
    pub sanitize_message: String,
    pub message: String,
}

impl IngestionReceipt {
    pub fn was_scanned(&self) -> bool {
        self.scan.verdict == Verdict::Clean
    }
}
