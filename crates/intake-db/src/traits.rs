//! Repository trait abstractions
//!
//! The ingestion service depends on these traits rather than on `PgPool`, so the
//! pipeline can be exercised without a database.

use async_trait::async_trait;
use intake_core::models::{
    ExtractedData, NewAuditLogEntry, NewExtractedData, NewSource, Source,
};
use intake_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Insert a Source and its ExtractedData atomically. Neither row exists if either insert fails.
    async fn create_with_extracted(
        &self,
        source: NewSource,
        extracted: NewExtractedData,
    ) -> Result<(Source, ExtractedData), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Source>, AppError>;

    async fn get_extracted(&self, source_id: Uuid) -> Result<Vec<ExtractedData>, AppError>;

    /// Delete ExtractedData then the Source, atomically. Returns false when the Source did not exist.
    async fn delete_cascade(&self, id: Uuid) -> Result<bool, AppError>;

    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Append-only audit sink. Entries are never updated or deleted.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append one entry, returning its creation-order id.
    async fn append(&self, entry: &NewAuditLogEntry) -> Result<i64, AppError>;
}
