//! Audit logger
//!
//! Thin front for the append-only audit store. Recording never fails from the
//! caller's point of view: store errors are logged, counted and swallowed so an
//! unavailable audit table cannot block uploads. Every event is also emitted on
//! the `audit` tracing target.

use intake_core::models::{AuditAction, NewAuditLogEntry, RequestMeta};
use intake_db::AuditLogRepository;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct AuditLogger {
    repository: Arc<dyn AuditLogRepository>,
    failures: Arc<AtomicU64>,
}

impl AuditLogger {
    pub fn new(repository: Arc<dyn AuditLogRepository>) -> Self {
        Self {
            repository,
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Append one entry. Entries recorded by one caller are appended in call order.
    pub async fn record(
        &self,
        principal_id: Option<Uuid>,
        action: AuditAction,
        message: impl Into<String>,
        meta: &RequestMeta,
    ) {
        let entry = NewAuditLogEntry::new(action, message)
            .with_principal(principal_id)
            .with_request(meta);

        tracing::info!(
            target: "audit",
            action = %entry.action,
            principal_id = ?entry.principal_id,
            ip_address = ?entry.ip_address,
            user_agent = %entry.user_agent,
            message = %entry.message,
            "audit event"
        );

        if let Err(e) = self.repository.append(&entry).await {
            let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(
                error = %e,
                action = %entry.action,
                audit_failures = failures,
                "Failed to write audit log entry"
            );
        }
    }

    /// Number of entries that could not be written since startup.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
