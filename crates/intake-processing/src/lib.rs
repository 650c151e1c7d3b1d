//! Intake Processing Library
//!
//! Format-specific sanitization and extraction for uploaded sources, plus the
//! text sanitizer applied to every extracted tree and content hashing.

pub mod extractor;
pub mod hashing;
pub mod metadata;
pub mod sanitizer;
pub mod text;
pub mod traits;

mod fs;

#[cfg(feature = "image")]
pub mod image;

#[cfg(feature = "document")]
pub mod document;

#[cfg(feature = "spreadsheet")]
pub mod spreadsheet;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types
pub use extractor::{FormatExtractor, OcrConfig};
pub use hashing::{hash_bytes, hash_file, hash_tree};
pub use metadata::{DocumentMetadata, ImageMetadata, SAFE_COLOR_MODES};
pub use sanitizer::{FormatSanitizer, SanitizeOutcome};
pub use text::{sanitize_text, sanitize_tree, REMOVED_MARKER};
pub use traits::{ContentExtractor, FileSanitizer};
