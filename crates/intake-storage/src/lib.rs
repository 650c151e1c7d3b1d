//! Intake Storage Library
//!
//! Filesystem storage for accepted source files. The pipeline writes an upload once
//! into its working location and that location becomes permanent on success, so the
//! storage layer hands back real paths for the scanner, sanitizer and extractor.
//!
//! # Storage key format
//!
//! `sources/{principal_id}/{source_id}.{extension}`. Keys must not contain `..` or a
//! leading `/`. Key generation is centralized in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::source_key;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
