//! Image handling
//!
//! - Decode and re-encode with a normalized color mode (sanitizer)
//! - Dimensions, format, color mode and optional OCR text (extractor)

pub mod extractor;
pub mod ocr;
pub mod sanitizer;

pub use extractor::ImageExtractor;
pub use sanitizer::ImageSanitizer;
