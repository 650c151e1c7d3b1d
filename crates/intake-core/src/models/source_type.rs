use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::AppError;

/// Declared source format of an upload.
///
/// The set is closed: every variant has a fixed extension allowlist and any
/// declared type outside this enum is rejected before a file touches disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "source_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Pdf,
    Image,
    Excel,
}

impl SourceType {
    pub const ALL: [SourceType; 3] = [SourceType::Pdf, SourceType::Image, SourceType::Excel];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Pdf => "pdf",
            SourceType::Image => "image",
            SourceType::Excel => "excel",
        }
    }

    /// Lowercase extensions (without the dot) accepted for this type.
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            SourceType::Pdf => &["pdf"],
            SourceType::Image => &["png", "jpg", "jpeg", "gif"],
            SourceType::Excel => &["xlsx", "xls"],
        }
    }

    pub fn accepts_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.').to_lowercase();
        self.allowed_extensions().contains(&extension.as_str())
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(SourceType::Pdf),
            "image" => Ok(SourceType::Image),
            "excel" => Ok(SourceType::Excel),
            other => Err(AppError::InvalidType(format!(
                "Unsupported source type '{}'. Allowed: pdf, image, excel",
                other
            ))),
        }
    }
}
