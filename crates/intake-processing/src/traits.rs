//! Seams between the ingestion pipeline and format handling

use async_trait::async_trait;
use intake_core::models::{SourceType, StructuredDocument};
use intake_core::AppError;
use std::path::Path;

use crate::sanitizer::SanitizeOutcome;

/// Rewrites a file in place so that active and embedded content is gone.
///
/// Never fails with an error: failures are reported through `SanitizeOutcome::ok`
/// and the file is left as it was.
#[async_trait]
pub trait FileSanitizer: Send + Sync {
    async fn sanitize(&self, path: &Path, source_type: SourceType) -> SanitizeOutcome;
}

/// Parses a sanitized file into its canonical tree.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Errors are `AppError::ExtractFailure` naming the file and the cause.
    async fn extract(
        &self,
        path: &Path,
        source_type: SourceType,
    ) -> Result<StructuredDocument, AppError>;
}
