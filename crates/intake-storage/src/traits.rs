//! Storage abstraction trait

use async_trait::async_trait;
use intake_core::AppError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::NotFound(key) => AppError::NotFound(format!("Stored file {}", key)),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// Every key maps to a file on the local filesystem so that external tools (the
/// malware scanner, OCR) and format libraries can operate on a path.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `storage_key` and return the file's path.
    async fn put(&self, storage_key: &str, data: &[u8]) -> StorageResult<PathBuf>;

    /// Read the full contents stored under `storage_key`.
    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file. Deleting a missing key is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Resolve a key to its path without touching the file.
    fn path_for(&self, storage_key: &str) -> StorageResult<PathBuf>;

    /// Root directory of this storage.
    fn root(&self) -> &Path;
}
