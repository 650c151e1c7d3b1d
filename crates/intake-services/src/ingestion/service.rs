use intake_core::constants::MAX_FILENAME_LEN;
use intake_core::models::{
    AuditAction, NewExtractedData, NewSource, Principal, RequestMeta, SourceType, Verdict,
};
use intake_core::AppError;
use intake_db::SourceRepository;
use intake_processing::{hash_file, hash_tree, sanitize_tree, ContentExtractor, FileSanitizer};
use intake_storage::{source_key, Storage};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use super::types::{IngestionPolicy, IngestionReceipt, UploadRequest};
use super::validation::{check_declared_type, sanitize_file_name};
use super::working_file::WorkingFile;
use crate::audit::AuditLogger;
use crate::scanner::Scanner;

pub const SUCCESS_MESSAGE: &str = "File uploaded and processed successfully";

/// Runs an upload through validation, scanning, sanitization, extraction and
/// persistence, and undoes accepted uploads on request.
///
/// Every call records one `upload_attempt` (once the file is about to be written)
/// and exactly one outcome entry. Rejections before the write record only the
/// outcome. A working file never outlives a failed call.
#[derive(Clone)]
pub struct IngestionService {
    storage: Arc<dyn Storage>,
    sources: Arc<dyn SourceRepository>,
    audit: AuditLogger,
    scanner: Arc<dyn Scanner>,
    sanitizer: Arc<dyn FileSanitizer>,
    extractor: Arc<dyn ContentExtractor>,
    policy: IngestionPolicy,
}

impl IngestionService {
    pub fn new(
        storage: Arc<dyn Storage>,
        sources: Arc<dyn SourceRepository>,
        audit: AuditLogger,
        scanner: Arc<dyn Scanner>,
        sanitizer: Arc<dyn FileSanitizer>,
        extractor: Arc<dyn ContentExtractor>,
        policy: IngestionPolicy,
    ) -> Self {
        Self {
            storage,
            sources,
            audit,
            scanner,
            sanitizer,
            extractor,
            policy,
        }
    }

    pub fn policy(&self) -> IngestionPolicy {
        self.policy
    }

    pub fn scanner_name(&self) -> &'static str {
        self.scanner.name()
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub async fn check_database(&self) -> Result<(), AppError> {
        self.sources.ping().await
    }

    /// Run one upload to completion on its own task.
    ///
    /// Once the file has been written the pipeline must reach an outcome even if
    /// the caller goes away, so the work is detached from the caller's future.
    pub async fn ingest(&self, request: UploadRequest) -> Result<IngestionReceipt, AppError> {
        let service = self.clone();
        tokio::spawn(async move { service.run_ingest(request).await }.in_current_span())
            .await
            .map_err(|e| AppError::Internal(format!("Ingestion task failed: {}", e)))?
    }

    #[tracing::instrument(
        name = "ingest",
        skip(self, request),
        fields(
            declared_type = %request.declared_type,
            principal_id = ?request.principal.map(|p| p.id()),
            file_name = request.file.as_ref().map(|f| f.file_name.as_str()).unwrap_or("")
        )
    )]
    async fn run_ingest(&self, request: UploadRequest) -> Result<IngestionReceipt, AppError> {
        let start = Instant::now();
        let UploadRequest {
            declared_type,
            file,
            principal,
            meta,
        } = request;
        let principal_id = principal.map(|p| p.id());

        let Some(file) = file else {
            self.audit
                .record(
                    principal_id,
                    AuditAction::UploadAttempt,
                    "Upload attempted without a file.",
                    &meta,
                )
                .await;
            return Err(AppError::InvalidInput("No file was provided".to_string()));
        };

        let (source_type, extension, file_name) =
            match validate_upload_name(&declared_type, &file.file_name) {
                Ok(checked) => checked,
                Err(e) => {
                    tracing::warn!(error = %e, "Upload rejected: declared type or file name");
                    self.audit
                        .record(
                            principal_id,
                            AuditAction::UploadRejectedType,
                            format!(
                                "Rejected upload '{}' declared as '{}': {}",
                                display_name(&file.file_name),
                                display_name(&declared_type),
                                e
                            ),
                            &meta,
                        )
                        .await;
                    return Err(e);
                }
            };

        if file.data.len() > self.policy.max_upload_size_bytes {
            tracing::warn!(
                size_bytes = file.data.len(),
                max_bytes = self.policy.max_upload_size_bytes,
                "Upload rejected: too large"
            );
            self.audit
                .record(
                    principal_id,
                    AuditAction::UploadRejectedSize,
                    format!(
                        "Rejected upload '{}': {} bytes exceeds the {} byte limit",
                        file_name,
                        file.data.len(),
                        self.policy.max_upload_size_bytes
                    ),
                    &meta,
                )
                .await;
            return Err(AppError::PayloadTooLarge(format!(
                "File is {} bytes; the maximum is {} bytes",
                file.data.len(),
                self.policy.max_upload_size_bytes
            )));
        }

        let Some(principal) = principal else {
            tracing::warn!("Upload rejected: no authenticated principal");
            self.audit
                .record(
                    None,
                    AuditAction::UploadRejectedUnauthenticated,
                    format!("Rejected anonymous upload '{}'", file_name),
                    &meta,
                )
                .await;
            return Err(AppError::Unauthorized(
                "Authentication is required to upload files".to_string(),
            ));
        };
        let owner = principal.id();

        let source_id = Uuid::new_v4();
        let storage_key = source_key(owner, source_id, &extension);

        self.audit
            .record(
                Some(owner),
                AuditAction::UploadAttempt,
                format!("Upload attempt: {} ({})", file_name, source_type),
                &meta,
            )
            .await;

        let aborted = Aborted {
            audit: &self.audit,
            owner,
            meta: &meta,
        };

        let path = match self.storage.path_for(&storage_key) {
            Ok(path) => path,
            Err(e) => {
                let error = AppError::from(e);
                self.audit
                    .record(
                        Some(owner),
                        AuditAction::UploadPersistFailed,
                        format!("Failed to store upload {}: {}", file_name, error),
                        &meta,
                    )
                    .await;
                return Err(error);
            }
        };
        let working = WorkingFile::new(path);

        if let Err(e) = self.storage.put(&storage_key, &file.data).await {
            let error = AppError::from(e);
            let message = format!("Failed to store upload {}: {}", file_name, error);
            return Err(aborted
                .finish(working, AuditAction::UploadPersistFailed, message, error)
                .await);
        }
        drop(file);

        let scan = self.scanner.scan(working.path()).await;
        match scan.verdict {
            Verdict::Clean => {}
            Verdict::Infected => {
                let message = format!("Blocked malware upload: {} - {}", file_name, scan.detail);
                return Err(aborted
                    .finish(
                        working,
                        AuditAction::UploadBlockedMalware,
                        message,
                        AppError::Infected(scan.detail),
                    )
                    .await);
            }
            Verdict::Unavailable if self.policy.scanner_fail_closed => {
                let message = format!(
                    "Blocked upload {}: malware scan unavailable - {}",
                    file_name, scan.detail
                );
                return Err(aborted
                    .finish(
                        working,
                        AuditAction::UploadBlockedScannerUnavailable,
                        message,
                        AppError::ScannerUnavailable(scan.detail),
                    )
                    .await);
            }
            Verdict::Unavailable => {
                tracing::warn!(
                    scanner = self.scanner.name(),
                    detail = %scan.detail,
                    "Malware scan unavailable, accepting upload without a verdict"
                );
            }
        }

        let sanitized = self.sanitizer.sanitize(working.path(), source_type).await;
        if !sanitized.ok {
            let message = format!("Sanitization failed for {}: {}", file_name, sanitized.message);
            return Err(aborted
                .finish(
                    working,
                    AuditAction::UploadSanitizeFailed,
                    message,
                    AppError::SanitizeFailure(sanitized.message),
                )
                .await);
        }

        let document = match self.extractor.extract(working.path(), source_type).await {
            Ok(document) => document,
            Err(e) => {
                // The extractor only sees the storage name
                let e = match e {
                    AppError::ExtractFailure { cause, .. } => AppError::ExtractFailure {
                        file: file_name.clone(),
                        cause,
                    },
                    other => other,
                };
                let message = format!("Extraction failed for {}: {}", file_name, e);
                return Err(aborted
                    .finish(working, AuditAction::UploadExtractFailed, message, e)
                    .await);
            }
        };

        let data = match document.to_tree() {
            Ok(tree) => sanitize_tree(tree),
            Err(e) => {
                let error = AppError::ExtractFailure {
                    file: file_name.clone(),
                    cause: e.to_string(),
                };
                let message = format!("Extraction failed for {}: {}", file_name, error);
                return Err(aborted
                    .finish(working, AuditAction::UploadExtractFailed, message, error)
                    .await);
            }
        };

        let hashes = match hash_file(working.path()).await {
            Ok(file_hash) => hash_tree(&data).map(|content_hash| (file_hash, content_hash)),
            Err(e) => Err(e),
        };
        let (file_hash, content_hash) = match hashes {
            Ok(hashes) => hashes,
            Err(e) => {
                let error = AppError::Persistence(format!("Failed to hash upload: {:#}", e));
                let message = format!("Failed to persist upload {}: {}", file_name, error);
                return Err(aborted
                    .finish(working, AuditAction::UploadPersistFailed, message, error)
                    .await);
            }
        };

        let new_source = NewSource {
            id: source_id,
            principal_id: owner,
            source_type,
            file_name: file_name.clone(),
            storage_key,
            file_hash,
        };
        let new_extracted = NewExtractedData {
            id: Uuid::new_v4(),
            principal_id: owner,
            data,
            content_hash,
        };

        let (source, extracted) = match self
            .sources
            .create_with_extracted(new_source, new_extracted)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                let error = AppError::Persistence(e.to_string());
                let message = format!("Failed to persist upload {}: {}", file_name, e);
                return Err(aborted
                    .finish(working, AuditAction::UploadPersistFailed, message, error)
                    .await);
            }
        };
        working.keep();

        let (message, scan_note) = match scan.verdict {
            Verdict::Unavailable => (
                format!("{} (malware scan unavailable: {})", SUCCESS_MESSAGE, scan.detail),
                format!("; malware scan unavailable: {}", scan.detail),
            ),
            _ => (SUCCESS_MESSAGE.to_string(), String::new()),
        };

        self.audit
            .record(
                Some(owner),
                AuditAction::UploadSuccess,
                format!(
                    "Upload successful: {} stored as source {} (file {}, content {}){}",
                    file_name,
                    source.id,
                    source.short_file_hash(),
                    extracted.short_content_hash(),
                    scan_note
                ),
                &meta,
            )
            .await;

        tracing::info!(
            source_id = %source.id,
            extracted_data_id = %extracted.id,
            source_type = %source_type,
            verdict = %scan.verdict,
            duration_ms = start.elapsed().as_millis(),
            "Upload ingested"
        );

        Ok(IngestionReceipt {
            source,
            extracted,
            scan,
            sanitize_message: sanitized.message,
            message,
        })
    }

    /// Undo an accepted upload: remove the Source, its ExtractedData and the stored file.
    ///
    /// Only the owning principal may delete. Audit history is appended to, never rewritten.
    #[tracing::instrument(skip(self, meta), fields(principal_id = %principal.id()))]
    pub async fn delete_source(
        &self,
        source_id: Uuid,
        principal: Principal,
        meta: &RequestMeta,
    ) -> Result<(), AppError> {
        let source = self
            .sources
            .get(source_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Source {}", source_id)))?;

        if !source.is_owned_by(principal.id()) {
            tracing::warn!(owner_id = %source.principal_id, "Delete refused: not the owner");
            return Err(AppError::Forbidden(
                "You do not have permission to delete this source".to_string(),
            ));
        }

        if !self.sources.delete_cascade(source_id).await? {
            return Err(AppError::NotFound(format!("Source {}", source_id)));
        }

        if let Err(e) = self.storage.delete(&source.storage_key).await {
            tracing::warn!(
                storage_key = %source.storage_key,
                error = %e,
                "Source rows deleted but the stored file could not be removed"
            );
        }

        self.audit
            .record(
                Some(principal.id()),
                AuditAction::UploadUndo,
                format!("Undo upload: {} (source {})", source.file_name, source.id),
                meta,
            )
            .await;

        tracing::info!(storage_key = %source.storage_key, "Source deleted");
        Ok(())
    }
}

/// Abort path shared by every post-write failure: remove the working file, then
/// record the outcome.
struct Aborted<'a> {
    audit: &'a AuditLogger,
    owner: Uuid,
    meta: &'a RequestMeta,
}

impl Aborted<'_> {
    async fn finish(
        &self,
        working: WorkingFile,
        action: AuditAction,
        message: String,
        error: AppError,
    ) -> AppError {
        working.discard().await;
        tracing::warn!(action = action.as_str(), error = %error, "Upload aborted");
        self.audit
            .record(Some(self.owner), action, message, self.meta)
            .await;
        error
    }
}

fn validate_upload_name(
    declared_type: &str,
    file_name: &str,
) -> Result<(SourceType, String, String), AppError> {
    let file_name = sanitize_file_name(file_name)?;
    let (source_type, extension) = check_declared_type(declared_type, &file_name)?;
    Ok((source_type, extension, file_name))
}

/// Client-supplied text bounded for audit messages.
fn display_name(raw: &str) -> String {
    raw.chars().take(MAX_FILENAME_LEN).collect()
}
