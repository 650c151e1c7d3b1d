//! Upload ingestion pipeline
//!
//! `Received -> Scanning -> Sanitizing -> Extracting -> Persisting -> Accepted`, with
//! a single rejection exit from each step. Nothing is visible to other reads until
//! the Source and its ExtractedData are committed together.

mod service;
mod types;
pub mod validation;
mod working_file;

#[cfg(test)]
mod tests;

pub use service::{IngestionService, SUCCESS_MESSAGE};
pub use types::{IngestionPolicy, IngestionReceipt, UploadRequest, UploadedFile};
pub use working_file::WorkingFile;
