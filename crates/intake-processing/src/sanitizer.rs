//! Format dispatch for file sanitization

use async_trait::async_trait;
use intake_core::models::SourceType;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::traits::FileSanitizer;

/// Result of sanitizing one file. `path` is where the sanitized content lives,
/// which is always the path that was passed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SanitizeOutcome {
    pub ok: bool,
    pub path: PathBuf,
    pub message: String,
}

impl SanitizeOutcome {
    pub fn succeeded(path: &Path, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn failed(path: &Path, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Sanitizer for the built-in formats.
///
/// - pdf: page copy into a fresh document
/// - image: decode and re-encode as RGB/RGBA
/// - excel: passed through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatSanitizer;

impl FormatSanitizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSanitizer for FormatSanitizer {
    #[tracing::instrument(skip(self), fields(path = %path.display(), source_type = %source_type))]
    async fn sanitize(&self, path: &Path, source_type: SourceType) -> SanitizeOutcome {
        let outcome = match source_type {
            SourceType::Pdf => sanitize_pdf(path).await,
            SourceType::Image => sanitize_image(path).await,
            SourceType::Excel => {
                SanitizeOutcome::succeeded(path, "No sanitization applied for this file type.")
            }
        };

        if outcome.ok {
            tracing::debug!(message = %outcome.message, "Sanitization finished");
        } else {
            tracing::warn!(message = %outcome.message, "Sanitization failed");
        }

        outcome
    }
}

/// Run CPU-bound format work off the async runtime. Panics inside the format
/// library surface as errors.
async fn run_blocking<T, F>(work: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| anyhow::anyhow!("processing task failed: {}", e))?
}

#[cfg(feature = "document")]
async fn sanitize_pdf(path: &Path) -> SanitizeOutcome {
    let owned = path.to_path_buf();
    match run_blocking(move || crate::document::PdfSanitizer::sanitize(&owned)).await {
        Ok(_) => SanitizeOutcome::succeeded(path, "PDF sanitized successfully."),
        Err(e) => SanitizeOutcome::failed(path, format!("PDF sanitization failed: {:#}", e)),
    }
}

#[cfg(not(feature = "document"))]
async fn sanitize_pdf(path: &Path) -> SanitizeOutcome {
    SanitizeOutcome::failed(path, "PDF sanitization failed: PDF support is not enabled")
}

#[cfg(feature = "image")]
async fn sanitize_image(path: &Path) -> SanitizeOutcome {
    let owned = path.to_path_buf();
    match run_blocking(move || crate::image::ImageSanitizer::sanitize(&owned)).await {
        Ok(_) => SanitizeOutcome::succeeded(path, "Image sanitized successfully."),
        Err(e) => SanitizeOutcome::failed(path, format!("Image sanitization failed: {:#}", e)),
    }
}

#[cfg(not(feature = "image"))]
async fn sanitize_image(path: &Path) -> SanitizeOutcome {
    SanitizeOutcome::failed(path, "Image sanitization failed: image support is not enabled")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_pdf_with_script, sample_png};

    #[tokio::test]
    async fn test_pdf_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, sample_pdf_with_script()).unwrap();

        let outcome = FormatSanitizer.sanitize(&path, SourceType::Pdf).await;

        assert!(outcome.ok);
        assert_eq!(outcome.path, path);
        assert_eq!(outcome.message, "PDF sanitized successfully.");
    }

    #[tokio::test]
    async fn test_broken_pdf_outcome_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"%PDF-1.4 truncated").unwrap();

        let outcome = FormatSanitizer.sanitize(&path, SourceType::Pdf).await;

        assert!(!outcome.ok);
        assert!(outcome.message.starts_with("PDF sanitization failed:"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_image_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, sample_png()).unwrap();

        let outcome = FormatSanitizer.sanitize(&path, SourceType::Image).await;

        assert!(outcome.ok);
        assert_eq!(outcome.message, "Image sanitized successfully.");
    }

    #[tokio::test]
    async fn test_excel_passes_through_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        std::fs::write(&path, b"workbook bytes").unwrap();

        let outcome = FormatSanitizer.sanitize(&path, SourceType::Excel).await;

        assert!(outcome.ok);
        assert_eq!(outcome.message, "No sanitization applied for this file type.");
        assert_eq!(std::fs::read(&path).unwrap(), b"workbook bytes");
    }
}
