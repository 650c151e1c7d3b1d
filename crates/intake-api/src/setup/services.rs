//! Wiring of storage, repositories, scanner and processing into the ingestion service

use anyhow::{Context, Result};
use intake_core::Config;
use intake_db::{PgAuditLogRepository, PgSourceRepository};
use intake_processing::{FormatExtractor, FormatSanitizer, OcrConfig};
use intake_services::{scanner_from_config, AuditLogger, IngestionPolicy, IngestionService};
use intake_storage::LocalStorage;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::state::{AppState, RequestConfig};

pub async fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let storage = LocalStorage::new(config.storage_path())
        .await
        .with_context(|| format!("Failed to open storage at {}", config.storage_path()))?;
    tracing::info!(path = %config.storage_path(), "Local storage ready");

    let scanner = scanner_from_config(config)?;

    let ocr = config.ocr_enabled().then(|| OcrConfig {
        binary: config.tesseract_path().to_string(),
        timeout: Duration::from_secs(config.ocr_timeout_secs()),
    });
    let extractor = FormatExtractor::new(ocr);
    tracing::info!(ocr_enabled = extractor.ocr_enabled(), "Extractor configured");

    let policy = IngestionPolicy::from_config(config);
    if !policy.scanner_fail_closed {
        tracing::warn!(
            "SCANNER_FAIL_CLOSED is off: uploads are accepted when the scanner gives no verdict"
        );
    }

    let ingestion = IngestionService::new(
        Arc::new(storage),
        Arc::new(PgSourceRepository::new(pool.clone())),
        AuditLogger::new(Arc::new(PgAuditLogRepository::new(pool))),
        scanner,
        Arc::new(FormatSanitizer::new()),
        Arc::new(extractor),
        policy,
    );

    Ok(Arc::new(AppState {
        ingestion,
        request: RequestConfig::from_config(config)?,
        is_production: config.is_production(),
    }))
}
