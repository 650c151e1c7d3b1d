use intake_core::models::{Principal, RequestMeta, Verdict};
use intake_core::AppError;
use intake_db::SourceRepository;
use intake_processing::testing::{sample_pdf, sample_pdf_with_script, sample_png};
use intake_processing::{hash_bytes, hash_tree};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::*;
use crate::testing::{FailingExtractor, FailingSanitizer, StaticScanner, TestHarness};

fn meta() -> RequestMeta {
    RequestMeta::new(Some("203.0.113.9".to_string()), Some("intake-test/1.0"))
}

fn upload(declared_type: &str, file_name: &str, data: Vec<u8>, owner: Uuid) -> UploadRequest {
    UploadRequest {
        declared_type: declared_type.to_string(),
        file: Some(UploadedFile::new(file_name, data)),
        principal: Some(Principal(owner)),
        meta: meta(),
    }
}

#[tokio::test]
async fn test_pdf_upload_is_accepted() {
    let harness = TestHarness::new(StaticScanner::clean()).await;
    let owner = Uuid::new_v4();

    let receipt = harness
        .service
        .ingest(upload("pdf", "report.pdf", sample_pdf(), owner))
        .await
        .unwrap();

    assert_eq!(receipt.message, SUCCESS_MESSAGE);
    assert_eq!(receipt.scan.verdict, Verdict::Clean);
    assert_eq!(receipt.sanitize_message, "PDF sanitized successfully.");
    assert_eq!(receipt.source.principal_id, owner);
    assert_eq!(receipt.source.file_name, "report.pdf");
    assert!(receipt
        .source
        .storage_key
        .starts_with(&format!("sources/{}/", owner)));
    assert_eq!(receipt.extracted.source_id, receipt.source.id);
    assert_eq!(receipt.extracted.data["type"], "pdf");
    assert_eq!(receipt.extracted.data["pages"], 1);

    assert_eq!(harness.sources.source_count(), 1);
    assert_eq!(harness.sources.extracted_count(), 1);
    assert_eq!(harness.scanner.calls(), 1);
    assert_eq!(
        harness.audit_log.actions(),
        vec!["upload_attempt", "upload_success"]
    );
}

#[tokio::test]
async fn test_stored_hashes_match_recomputed() {
    let harness = TestHarness::new(StaticScanner::clean()).await;
    let original = sample_pdf_with_script();

    let receipt = harness
        .service
        .ingest(upload("pdf", "scripted.pdf", original.clone(), Uuid::new_v4()))
        .await
        .unwrap();

    let stored = std::fs::read(harness.storage_root().join(&receipt.source.storage_key)).unwrap();
    assert_eq!(receipt.source.file_hash, hash_bytes(&stored));
    assert_ne!(receipt.source.file_hash, hash_bytes(&original));
    assert_eq!(
        receipt.extracted.content_hash,
        hash_tree(&receipt.extracted.data).unwrap()
    );
}

#[tokio::test]
async fn test_image_upload_is_normalized() {
    let harness = TestHarness::new(StaticScanner::clean()).await;

    let receipt = harness
        .service
        .ingest(upload("image", "logo.png", sample_png(), Uuid::new_v4()))
        .await
        .unwrap();

    let data = &receipt.extracted.data;
    assert_eq!(data["type"], "image");
    assert_eq!(data["format"], "PNG");
    assert_eq!(data["width"], 16);
    assert_eq!(data["height"], 8);
    assert_eq!(data["color_mode"], "RGBA");
    assert!(data["text"].is_null());
}

#[tokio::test]
async fn test_infected_upload_is_blocked_and_removed() {
    let harness = TestHarness::new(StaticScanner::infected("Eicar-Test-Signature FOUND")).await;

    let err = harness
        .service
        .ingest(upload("pdf", "evil.pdf", sample_pdf(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Infected(ref detail) if detail.contains("Eicar")));
    assert_eq!(harness.sources.source_count(), 0);
    assert_eq!(harness.sources.extracted_count(), 0);
    assert!(harness.stored_files().is_empty());
    assert_eq!(
        harness.audit_log.actions(),
        vec!["upload_attempt", "upload_blocked_malware"]
    );
    assert!(harness.audit_log.entries()[1].message.contains("Eicar"));
}

#[tokio::test]
async fn test_disallowed_extension_never_reaches_scanner() {
    let harness = TestHarness::new(StaticScanner::clean()).await;

    let err = harness
        .service
        .ingest(upload("pdf", "notes.exe", b"MZ\x90\x00".to_vec(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidType(_)));
    assert_eq!(harness.scanner.calls(), 0);
    assert!(harness.stored_files().is_empty());
    assert_eq!(harness.audit_log.actions(), vec!["upload_rejected_type"]);
}

#[tokio::test]
async fn test_long_name_cannot_truncate_away_extension() {
    let harness = TestHarness::new(StaticScanner::clean()).await;
    let name = format!("{}.pdf.exe", "a".repeat(251));

    let err = harness
        .service
        .ingest(upload("pdf", &name, sample_pdf(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidType(_)));
    assert_eq!(harness.scanner.calls(), 0);
    assert!(harness.stored_files().is_empty());
    assert_eq!(harness.audit_log.actions(), vec!["upload_rejected_type"]);
}

#[tokio::test]
async fn test_unknown_declared_type_is_rejected() {
    let harness = TestHarness::new(StaticScanner::clean()).await;

    let err = harness
        .service
        .ingest(upload("word", "letter.pdf", sample_pdf(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidType(_)));
    assert_eq!(harness.scanner.calls(), 0);
    assert_eq!(harness.audit_log.count("upload_rejected_type"), 1);
}

#[tokio::test]
async fn test_traversal_file_name_is_rejected_before_write() {
    let harness = TestHarness::new(StaticScanner::clean()).await;

    let err = harness
        .service
        .ingest(upload("pdf", "../../etc/report.pdf", sample_pdf(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(harness.stored_files().is_empty());
    assert_eq!(harness.audit_log.actions(), vec!["upload_rejected_type"]);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_before_write() {
    let harness = TestHarness::builder(StaticScanner::clean())
        .policy(IngestionPolicy {
            max_upload_size_bytes: 64,
            scanner_fail_closed: false,
        })
        .build()
        .await;

    let err = harness
        .service
        .ingest(upload("pdf", "report.pdf", sample_pdf(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PayloadTooLarge(_)));
    assert_eq!(harness.scanner.calls(), 0);
    assert!(harness.stored_files().is_empty());
    assert_eq!(harness.audit_log.actions(), vec!["upload_rejected_size"]);
}

#[tokio::test]
async fn test_anonymous_upload_is_rejected() {
    let harness = TestHarness::new(StaticScanner::clean()).await;
    let mut request = upload("pdf", "report.pdf", sample_pdf(), Uuid::new_v4());
    request.principal = None;

    let err = harness.service.ingest(request).await.unwrap_err();

    assert!(matches!(err, AppError::Unauthorized(_)));
    assert!(harness.stored_files().is_empty());
    let entries = harness.audit_log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "upload_rejected_unauthenticated");
    assert_eq!(entries[0].principal_id, None);
}

#[tokio::test]
async fn test_missing_file_records_attempt() {
    let harness = TestHarness::new(StaticScanner::clean()).await;
    let owner = Uuid::new_v4();
    let request = UploadRequest {
        declared_type: "pdf".to_string(),
        file: None,
        principal: Some(Principal(owner)),
        meta: meta(),
    };

    let err = harness.service.ingest(request).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidInput(_)));
    let entries = harness.audit_log.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "upload_attempt");
    assert_eq!(entries[0].message, "Upload attempted without a file.");
    assert_eq!(entries[0].principal_id, Some(owner));
}

#[tokio::test]
async fn test_unavailable_scanner_fails_open_by_default() {
    let harness =
        TestHarness::new(StaticScanner::unavailable("Malware scan timed out after 60s.")).await;

    let receipt = harness
        .service
        .ingest(upload("pdf", "report.pdf", sample_pdf(), Uuid::new_v4()))
        .await
        .unwrap();

    assert_eq!(receipt.scan.verdict, Verdict::Unavailable);
    assert!(!receipt.was_scanned());
    assert!(receipt.message.starts_with(SUCCESS_MESSAGE));
    assert!(receipt.message.contains("malware scan unavailable"));

    let entries = harness.audit_log.entries();
    assert_eq!(entries[1].action, "upload_success");
    assert!(entries[1].message.contains("timed out"));
}

#[tokio::test]
async fn test_unavailable_scanner_fails_closed_when_configured() {
    let harness = TestHarness::builder(StaticScanner::unavailable(
        "Malware scanner (clamscan) not found on this system.",
    ))
    .policy(IngestionPolicy {
        scanner_fail_closed: true,
        ..IngestionPolicy::default()
    })
    .build()
    .await;

    let err = harness
        .service
        .ingest(upload("pdf", "report.pdf", sample_pdf(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ScannerUnavailable(_)));
    assert_eq!(harness.sources.source_count(), 0);
    assert!(harness.stored_files().is_empty());
    assert_eq!(
        harness.audit_log.actions(),
        vec!["upload_attempt", "upload_blocked_scanner_unavailable"]
    );
}

#[tokio::test]
async fn test_sanitize_failure_discards_file() {
    let harness = TestHarness::builder(StaticScanner::clean())
        .sanitizer(Arc::new(FailingSanitizer))
        .build()
        .await;

    let err = harness
        .service
        .ingest(upload("pdf", "report.pdf", sample_pdf(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::SanitizeFailure(_)));
    assert!(harness.stored_files().is_empty());
    assert_eq!(
        harness.audit_log.actions(),
        vec!["upload_attempt", "upload_sanitize_failed"]
    );
}

#[tokio::test]
async fn test_undecodable_image_fails_sanitization() {
    let harness = TestHarness::new(StaticScanner::clean()).await;

    let err = harness
        .service
        .ingest(upload("image", "photo.png", b"not really a png".to_vec(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(
        matches!(err, AppError::SanitizeFailure(ref msg) if msg.starts_with("Image sanitization failed"))
    );
    assert!(harness.stored_files().is_empty());
    assert_eq!(harness.sources.source_count(), 0);
}

#[tokio::test]
async fn test_extract_failure_discards_file() {
    let harness = TestHarness::builder(StaticScanner::clean())
        .extractor(Arc::new(FailingExtractor))
        .build()
        .await;

    let err = harness
        .service
        .ingest(upload("pdf", "report.pdf", sample_pdf(), Uuid::new_v4()))
        .await
        .unwrap_err();

    match &err {
        AppError::ExtractFailure { file, cause } => {
            assert_eq!(file, "report.pdf");
            assert_eq!(cause, "unreadable content");
        }
        other => panic!("expected extract failure, got {:?}", other),
    }
    assert!(err.to_string().contains("report.pdf"));
    assert!(harness.stored_files().is_empty());
    assert_eq!(
        harness.audit_log.actions(),
        vec!["upload_attempt", "upload_extract_failed"]
    );
}

#[tokio::test]
async fn test_persistence_failure_rolls_back_everything() {
    let harness = TestHarness::new(StaticScanner::clean()).await;
    harness.sources.fail_extracted_insert(true);

    let err = harness
        .service
        .ingest(upload("pdf", "report.pdf", sample_pdf(), Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Persistence(_)));
    assert_eq!(harness.sources.source_count(), 0);
    assert_eq!(harness.sources.extracted_count(), 0);
    assert!(harness.stored_files().is_empty());
    assert_eq!(
        harness.audit_log.actions(),
        vec!["upload_attempt", "upload_persist_failed"]
    );
}

#[tokio::test]
async fn test_audit_entries_carry_request_meta() {
    let harness = TestHarness::new(StaticScanner::clean()).await;
    let owner = Uuid::new_v4();

    harness
        .service
        .ingest(upload("pdf", "report.pdf", sample_pdf(), owner))
        .await
        .unwrap();

    for entry in harness.audit_log.entries() {
        assert_eq!(entry.principal_id, Some(owner));
        assert_eq!(entry.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(entry.user_agent, "intake-test/1.0");
    }
}

#[tokio::test]
async fn test_delete_by_other_principal_is_forbidden() {
    let harness = TestHarness::new(StaticScanner::clean()).await;
    let owner = Uuid::new_v4();
    let receipt = harness
        .service
        .ingest(upload("pdf", "report.pdf", sample_pdf(), owner))
        .await
        .unwrap();
    let audit_before = harness.audit_log.entries();

    let err = harness
        .service
        .delete_source(receipt.source.id, Principal(Uuid::new_v4()), &meta())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(harness.sources.source_count(), 1);
    assert_eq!(harness.sources.extracted_count(), 1);
    assert!(harness
        .storage_root()
        .join(&receipt.source.storage_key)
        .exists());
    assert_eq!(harness.audit_log.entries().len(), audit_before.len());
}

#[tokio::test]
async fn test_delete_by_owner_removes_rows_and_file() {
    let harness = TestHarness::new(StaticScanner::clean()).await;
    let owner = Uuid::new_v4();
    let receipt = harness
        .service
        .ingest(upload("pdf", "report.pdf", sample_pdf(), owner))
        .await
        .unwrap();
    let audit_before = harness.audit_log.entries();

    harness
        .service
        .delete_source(receipt.source.id, Principal(owner), &meta())
        .await
        .unwrap();

    assert!(harness.sources.get(receipt.source.id).await.unwrap().is_none());
    assert_eq!(harness.sources.extracted_count(), 0);
    assert!(harness.stored_files().is_empty());

    let audit_after = harness.audit_log.entries();
    assert_eq!(audit_after.len(), audit_before.len() + 1);
    for (before, after) in audit_before.iter().zip(&audit_after) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.action, after.action);
        assert_eq!(before.message, after.message);
    }
    assert_eq!(audit_after.last().unwrap().action, "upload_undo");
    assert_eq!(harness.audit_log.count("upload_undo"), 1);
}

#[tokio::test]
async fn test_delete_missing_source_is_not_found() {
    let harness = TestHarness::new(StaticScanner::clean()).await;

    let err = harness
        .service
        .delete_source(Uuid::new_v4(), Principal(Uuid::new_v4()), &meta())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(harness.audit_log.entries().is_empty());
}

#[tokio::test]
async fn test_dropped_caller_still_completes_upload() {
    let harness = TestHarness::new(StaticScanner::clean()).await;
    harness
        .sources
        .delay_after_commit(Duration::from_millis(300));

    let cancelled = tokio::time::timeout(
        Duration::from_millis(100),
        harness
            .service
            .ingest(upload("pdf", "report.pdf", sample_pdf(), Uuid::new_v4())),
    )
    .await;
    assert!(cancelled.is_err());

    let mut waited = Duration::ZERO;
    while harness.audit_log.count("upload_success") == 0 && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(50)).await;
        waited += Duration::from_millis(50);
    }

    assert_eq!(harness.sources.source_count(), 1);
    assert_eq!(harness.sources.extracted_count(), 1);
    assert_eq!(harness.stored_files().len(), 1);
    assert_eq!(
        harness.audit_log.actions(),
        vec!["upload_attempt", "upload_success"]
    );
}
