//! Test doubles and a wired-up in-memory pipeline

use async_trait::async_trait;
use intake_core::models::{ScanOutcome, SourceType, StructuredDocument};
use intake_core::AppError;
use intake_db::testing::{InMemoryAuditLogRepository, InMemorySourceRepository};
use intake_processing::{
    ContentExtractor, FileSanitizer, FormatExtractor, FormatSanitizer, SanitizeOutcome,
};
use intake_storage::LocalStorage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use crate::audit::AuditLogger;
use crate::ingestion::{IngestionPolicy, IngestionService};
use crate::scanner::Scanner;

/// Scanner returning a canned outcome and counting how often it was asked.
#[derive(Clone)]
pub struct StaticScanner {
    outcome: ScanOutcome,
    calls: Arc<AtomicUsize>,
}

impl StaticScanner {
    pub fn new(outcome: ScanOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn clean() -> Self {
        Self::new(ScanOutcome::clean("File is clean (ClamAV)."))
    }

    pub fn infected(detail: &str) -> Self {
        Self::new(ScanOutcome::infected(detail))
    }

    pub fn unavailable(detail: &str) -> Self {
        Self::new(ScanOutcome::unavailable(detail))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Scanner for StaticScanner {
    async fn scan(&self, _path: &Path) -> ScanOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Sanitizer that reports failure without touching the file.
#[derive(Debug, Clone, Default)]
pub struct FailingSanitizer;

#[async_trait]
impl FileSanitizer for FailingSanitizer {
    async fn sanitize(&self, path: &Path, source_type: SourceType) -> SanitizeOutcome {
        SanitizeOutcome::failed(path, format!("{} could not be re-encoded", source_type))
    }
}

/// Extractor that always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingExtractor;

#[async_trait]
impl ContentExtractor for FailingExtractor {
    async fn extract(
        &self,
        path: &Path,
        _source_type: SourceType,
    ) -> Result<StructuredDocument, AppError> {
        Err(AppError::ExtractFailure {
            file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            cause: "unreadable content".to_string(),
        })
    }
}

/// Ingestion service over a temp directory and in-memory repositories.
pub struct TestHarness {
    pub service: IngestionService,
    pub sources: InMemorySourceRepository,
    pub audit_log: InMemoryAuditLogRepository,
    pub scanner: StaticScanner,
    storage_dir: TempDir,
}

impl TestHarness {
    pub async fn new(scanner: StaticScanner) -> Self {
        Self::builder(scanner).build().await
    }

    pub fn builder(scanner: StaticScanner) -> TestHarnessBuilder {
        TestHarnessBuilder {
            scanner,
            sanitizer: Arc::new(FormatSanitizer::new()),
            extractor: Arc::new(FormatExtractor::default()),
            policy: IngestionPolicy::default(),
        }
    }

    pub fn storage_root(&self) -> &Path {
        self.storage_dir.path()
    }

    /// Every regular file currently under the storage root.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut pending = vec![self.storage_dir.path().to_path_buf()];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    files.push(path);
                }
            }
        }
        files
    }
}

pub struct TestHarnessBuilder {
    scanner: StaticScanner,
    sanitizer: Arc<dyn FileSanitizer>,
    extractor: Arc<dyn ContentExtractor>,
    policy: IngestionPolicy,
}

impl TestHarnessBuilder {
    pub fn sanitizer(mut self, sanitizer: Arc<dyn FileSanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn policy(mut self, policy: IngestionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn build(self) -> TestHarness {
        let storage_dir = tempfile::tempdir().expect("create storage dir");
        let storage = LocalStorage::new(storage_dir.path())
            .await
            .expect("create local storage");
        let sources = InMemorySourceRepository::new();
        let audit_log = InMemoryAuditLogRepository::new();

        let service = IngestionService::new(
            Arc::new(storage),
            Arc::new(sources.clone()),
            AuditLogger::new(Arc::new(audit_log.clone())),
            Arc::new(self.scanner.clone()),
            self.sanitizer,
            self.extractor,
            self.policy,
        );

        TestHarness {
            service,
            sources,
            audit_log,
            scanner: self.scanner,
            storage_dir,
        }
    }
}
