//! In-memory repository implementations for testing
//!
//! These let the ingestion pipeline and HTTP handlers run without a database.

use async_trait::async_trait;
use chrono::Utc;
use intake_core::models::{
    AuditLogEntry, ExtractedData, NewAuditLogEntry, NewExtractedData, NewSource, Source,
};
use intake_core::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use crate::traits::{AuditLogRepository, SourceRepository};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct SourceTables {
    sources: HashMap<Uuid, Source>,
    extracted: HashMap<Uuid, ExtractedData>,
}

/// In-memory source repository. Both tables sit behind one lock so a failed
/// write leaves no partial state, matching the transactional Postgres version.
#[derive(Clone, Default)]
pub struct InMemorySourceRepository {
    tables: Arc<Mutex<SourceTables>>,
    fail_extracted_insert: Arc<AtomicBool>,
    commit_delay: Arc<Mutex<Option<Duration>>>,
}

impl InMemorySourceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next extracted-data insert fail after the source row was staged.
    pub fn fail_extracted_insert(&self, fail: bool) {
        self.fail_extracted_insert.store(fail, Ordering::SeqCst);
    }

    /// Hold `create_with_extracted` open for `delay` after both rows are committed.
    pub fn delay_after_commit(&self, delay: Duration) {
        *lock(&self.commit_delay) = Some(delay);
    }

    pub fn source_count(&self) -> usize {
        lock(&self.tables).sources.len()
    }

    pub fn extracted_count(&self) -> usize {
        lock(&self.tables).extracted.len()
    }

    pub fn insert_source(&self, source: Source) {
        lock(&self.tables).sources.insert(source.id, source);
    }

    pub fn insert_extracted(&self, extracted: ExtractedData) {
        lock(&self.tables).extracted.insert(extracted.id, extracted);
    }
}

#[async_trait]
impl SourceRepository for InMemorySourceRepository {
    async fn create_with_extracted(
        &self,
        source: NewSource,
        extracted: NewExtractedData,
    ) -> Result<(Source, ExtractedData), AppError> {
        let now = Utc::now();
        let source_row = Source {
            id: source.id,
            principal_id: source.principal_id,
            source_type: source.source_type,
            file_name: source.file_name,
            storage_key: source.storage_key,
            file_hash: source.file_hash,
            created_at: now,
            updated_at: now,
        };

        if self.fail_extracted_insert.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "simulated extracted_data insert failure".to_string(),
            ));
        }

        let extracted_row = ExtractedData {
            id: extracted.id,
            source_id: source_row.id,
            principal_id: extracted.principal_id,
            data: extracted.data,
            content_hash: extracted.content_hash,
            created_at: now,
        };

        {
            let mut tables = lock(&self.tables);
            tables.sources.insert(source_row.id, source_row.clone());
            tables
                .extracted
                .insert(extracted_row.id, extracted_row.clone());
        }

        let delay = *lock(&self.commit_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok((source_row, extracted_row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Source>, AppError> {
        Ok(lock(&self.tables).sources.get(&id).cloned())
    }

    async fn get_extracted(&self, source_id: Uuid) -> Result<Vec<ExtractedData>, AppError> {
        Ok(lock(&self.tables)
            .extracted
            .values()
            .filter(|e| e.source_id == source_id)
            .cloned()
            .collect())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = lock(&self.tables);
        tables.extracted.retain(|_, e| e.source_id != id);
        Ok(tables.sources.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// In-memory audit log that keeps entries in append order.
#[derive(Clone, Default)]
pub struct InMemoryAuditLogRepository {
    entries: Arc<Mutex<Vec<AuditLogEntry>>>,
}

impl InMemoryAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditLogEntry> {
        lock(&self.entries).clone()
    }

    /// Action tags in append order.
    pub fn actions(&self) -> Vec<String> {
        lock(&self.entries)
            .iter()
            .map(|e| e.action.clone())
            .collect()
    }

    pub fn count(&self, action: &str) -> usize {
        lock(&self.entries)
            .iter()
            .filter(|e| e.action == action)
            .count()
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLogRepository {
    async fn append(&self, entry: &NewAuditLogEntry) -> Result<i64, AppError> {
        let mut entries = lock(&self.entries);
        let id = entries.len() as i64 + 1;
        entries.push(AuditLogEntry {
            id,
            created_at: Utc::now(),
            principal_id: entry.principal_id,
            action: entry.action.as_str().to_string(),
            message: entry.message.clone(),
            ip_address: entry.ip_address.clone(),
            user_agent: entry.user_agent.clone(),
        });
        Ok(id)
    }
}

/// Audit repository whose store is always unavailable.
#[derive(Clone, Default)]
pub struct FailingAuditLogRepository;

#[async_trait]
impl AuditLogRepository for FailingAuditLogRepository {
    async fn append(&self, _entry: &NewAuditLogEntry) -> Result<i64, AppError> {
        Err(AppError::Internal("audit store unavailable".to_string()))
    }
}
