use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::SourceType;
use crate::constants::SHORT_HASH_LEN;

/// Persisted record of an accepted upload.
///
/// `file_hash` is the sha256 of the sanitized file at `storage_key`, never of the
/// bytes as uploaded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Source {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub source_type: SourceType,
    pub file_name: String,
    pub storage_key: String,
    pub file_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Source {
    pub fn is_owned_by(&self, principal_id: Uuid) -> bool {
        self.principal_id == principal_id
    }

    pub fn short_file_hash(&self) -> String {
        short_hash(&self.file_hash)
    }
}

/// Structured content extracted from a Source.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ExtractedData {
    pub id: Uuid,
    pub source_id: Uuid,
    pub principal_id: Uuid,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

impl ExtractedData {
    pub fn short_content_hash(&self) -> String {
        short_hash(&self.content_hash)
    }
}

#[derive(Debug, Clone)]
pub struct NewSource {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub source_type: SourceType,
    pub file_name: String,
    pub storage_key: String,
    pub file_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewExtractedData {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub data: serde_json::Value,
    pub content_hash: String,
}

/// Operator-facing abbreviation of a hex digest ("-" when absent).
pub fn short_hash(hash: &str) -> String {
    if hash.is_empty() {
        return "-".to_string();
    }
    let prefix: String = hash.chars().take(SHORT_HASH_LEN).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(hash: &str) -> Source {
        Source {
            id: Uuid::new_v4(),
            principal_id: Uuid::new_v4(),
            source_type: SourceType::Pdf,
            file_name: "report.pdf".to_string(),
            storage_key: "sources/x/y.pdf".to_string(),
            file_hash: hash.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_short_file_hash() {
        let s = source("9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08");
        assert_eq!(s.short_file_hash(), "9f86d08188...");
        assert_eq!(source("").short_file_hash(), "-");
    }

    #[test]
    fn test_ownership() {
        let s = source("abc");
        assert!(s.is_owned_by(s.principal_id));
        assert!(!s.is_owned_by(Uuid::new_v4()));
    }
}
