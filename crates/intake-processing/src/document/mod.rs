//! PDF handling
//!
//! - Sanitization by page copy into a fresh document (sanitizer)
//! - Per-page text extraction (extractor)

pub mod extractor;
pub mod sanitizer;

pub use extractor::PdfExtractor;
pub use sanitizer::PdfSanitizer;
