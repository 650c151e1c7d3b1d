use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use super::RequestMeta;

/// Security-relevant event recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    UploadAttempt,
    UploadSuccess,
    UploadRejectedType,
    UploadRejectedSize,
    UploadRejectedUnauthenticated,
    UploadBlockedMalware,
    UploadBlockedScannerUnavailable,
    UploadSanitizeFailed,
    UploadExtractFailed,
    UploadPersistFailed,
    UploadUndo,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UploadAttempt => "upload_attempt",
            AuditAction::UploadSuccess => "upload_success",
            AuditAction::UploadRejectedType => "upload_rejected_type",
            AuditAction::UploadRejectedSize => "upload_rejected_size",
            AuditAction::UploadRejectedUnauthenticated => "upload_rejected_unauthenticated",
            AuditAction::UploadBlockedMalware => "upload_blocked_malware",
            AuditAction::UploadBlockedScannerUnavailable => "upload_blocked_scanner_unavailable",
            AuditAction::UploadSanitizeFailed => "upload_sanitize_failed",
            AuditAction::UploadExtractFailed => "upload_extract_failed",
            AuditAction::UploadPersistFailed => "upload_persist_failed",
            AuditAction::UploadUndo => "upload_undo",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry to append. Built with the `with_*` helpers and handed to the audit logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditLogEntry {
    pub principal_id: Option<Uuid>,
    pub action: AuditAction,
    pub message: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl NewAuditLogEntry {
    pub fn new(action: AuditAction, message: impl Into<String>) -> Self {
        Self {
            principal_id: None,
            action,
            message: message.into(),
            ip_address: None,
            user_agent: String::new(),
        }
    }

    pub fn with_principal(mut self, principal_id: Option<Uuid>) -> Self {
        self.principal_id = principal_id;
        self
    }

    pub fn with_request(mut self, meta: &RequestMeta) -> Self {
        self.ip_address = meta.ip_address.clone();
        self.user_agent = meta.user_agent.clone();
        self
    }
}

/// Stored audit row. `id` reflects creation order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditLogEntry {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub principal_id: Option<Uuid>,
    pub action: String,
    pub message: String,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags_match_serde() {
        for action in [
            AuditAction::UploadAttempt,
            AuditAction::UploadBlockedMalware,
            AuditAction::UploadSanitizeFailed,
            AuditAction::UploadUndo,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn test_builder_copies_request_meta() {
        let meta = RequestMeta::new(Some("203.0.113.5".to_string()), Some("Agent/1.0"));
        let principal = Uuid::new_v4();
        let entry = NewAuditLogEntry::new(AuditAction::UploadAttempt, "Upload attempt: a.pdf")
            .with_principal(Some(principal))
            .with_request(&meta);
        assert_eq!(entry.principal_id, Some(principal));
        assert_eq!(entry.ip_address.as_deref(), Some("203.0.113.5"));
        assert_eq!(entry.user_agent, "Agent/1.0");
    }
}
