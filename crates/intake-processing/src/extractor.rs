//! Format dispatch for structured extraction

use anyhow::{Context, Result};
use async_trait::async_trait;
use intake_core::models::{SourceType, StructuredDocument};
use intake_core::AppError;
use std::path::Path;
use std::time::Duration;

use crate::traits::ContentExtractor;

/// OCR settings for image extraction.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Path or name of the `tesseract` binary
    pub binary: String,
    pub timeout: Duration,
}

/// Extractor for the built-in formats.
#[derive(Debug, Clone, Default)]
pub struct FormatExtractor {
    ocr: Option<OcrConfig>,
}

impl FormatExtractor {
    /// `ocr = None` disables OCR; images then carry no text.
    pub fn new(ocr: Option<OcrConfig>) -> Self {
        Self { ocr }
    }

    pub fn ocr_enabled(&self) -> bool {
        self.ocr.is_some()
    }

    async fn extract_document(
        &self,
        path: &Path,
        source_type: SourceType,
    ) -> Result<StructuredDocument> {
        match source_type {
            SourceType::Pdf => self.extract_pdf(path).await,
            SourceType::Image => self.extract_image(path).await,
            SourceType::Excel => self.extract_excel(path).await,
        }
    }

    #[cfg(feature = "document")]
    async fn extract_pdf(&self, path: &Path) -> Result<StructuredDocument> {
        let data = tokio::fs::read(path).await.context("Failed to read file")?;
        let content = run_blocking(move || crate::document::PdfExtractor::extract_pages(&data))
            .await?;

        Ok(StructuredDocument::Pdf {
            pages: content.len(),
            content,
        })
    }

    #[cfg(not(feature = "document"))]
    async fn extract_pdf(&self, _path: &Path) -> Result<StructuredDocument> {
        anyhow::bail!("PDF support is not enabled")
    }

    #[cfg(feature = "image")]
    async fn extract_image(&self, path: &Path) -> Result<StructuredDocument> {
        let data = tokio::fs::read(path).await.context("Failed to read file")?;
        let metadata = run_blocking(move || crate::image::ImageExtractor::describe(&data)).await?;

        let text = match &self.ocr {
            Some(ocr) => Some(
                crate::image::ocr::recognize_text(&ocr.binary, path, ocr.timeout)
                    .await
                    .context("OCR failed")?,
            ),
            None => None,
        };

        Ok(StructuredDocument::Image {
            format: metadata.format,
            width: metadata.width,
            height: metadata.height,
            color_mode: metadata.color_mode,
            text,
        })
    }

    #[cfg(not(feature = "image"))]
    async fn extract_image(&self, _path: &Path) -> Result<StructuredDocument> {
        anyhow::bail!("Image support is not enabled")
    }

    #[cfg(feature = "spreadsheet")]
    async fn extract_excel(&self, path: &Path) -> Result<StructuredDocument> {
        let owned = path.to_path_buf();
        let sheets =
            run_blocking(move || crate::spreadsheet::SpreadsheetExtractor::extract_sheets(&owned))
                .await?;

        Ok(StructuredDocument::Excel { sheets })
    }

    #[cfg(not(feature = "spreadsheet"))]
    async fn extract_excel(&self, _path: &Path) -> Result<StructuredDocument> {
        anyhow::bail!("Spreadsheet support is not enabled")
    }
}

#[async_trait]
impl ContentExtractor for FormatExtractor {
    #[tracing::instrument(skip(self), fields(path = %path.display(), source_type = %source_type))]
    async fn extract(
        &self,
        path: &Path,
        source_type: SourceType,
    ) -> Result<StructuredDocument, AppError> {
        self.extract_document(path, source_type)
            .await
            .map_err(|e| AppError::ExtractFailure {
                file: file_label(path),
                cause: format!("{:#}", e),
            })
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| anyhow::anyhow!("extraction task failed: {}", e))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_pdf, sample_png};

    #[tokio::test]
    async fn test_extract_pdf_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, sample_pdf()).unwrap();

        let doc = FormatExtractor::default()
            .extract(&path, SourceType::Pdf)
            .await
            .unwrap();

        let tree = doc.to_tree().unwrap();
        assert_eq!(tree["type"], "pdf");
        assert_eq!(tree["pages"], 1);
        assert_eq!(tree["content"][0]["page"], 1);
    }

    #[tokio::test]
    async fn test_extract_image_without_ocr_has_no_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, sample_png()).unwrap();

        let doc = FormatExtractor::new(None)
            .extract(&path, SourceType::Image)
            .await
            .unwrap();

        match doc {
            StructuredDocument::Image {
                format,
                width,
                height,
                text,
                ..
            } => {
                assert_eq!(format, "PNG");
                assert_eq!((width, height), (16, 8));
                assert!(text.is_none());
            }
            other => panic!("expected image document, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ocr_failure_is_extract_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, sample_png()).unwrap();

        let extractor = FormatExtractor::new(Some(OcrConfig {
            binary: "/nonexistent/tesseract".to_string(),
            timeout: Duration::from_secs(5),
        }));
        let err = extractor
            .extract(&path, SourceType::Image)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ExtractFailure { ref file, .. } if file == "logo.png"));
    }

    #[tokio::test]
    async fn test_extract_failure_names_file_and_cause() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"garbage").unwrap();

        let err = FormatExtractor::default()
            .extract(&path, SourceType::Pdf)
            .await
            .unwrap_err();

        match err {
            AppError::ExtractFailure { file, cause } => {
                assert_eq!(file, "broken.pdf");
                assert!(cause.contains("PDF header"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_extract_failure() {
        let err = FormatExtractor::default()
            .extract(Path::new("/nonexistent/sheet.xlsx"), SourceType::Excel)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ExtractFailure { .. }));
    }
}
