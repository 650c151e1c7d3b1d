use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SourceType;

/// Canonical tree produced by extraction, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructuredDocument {
    Pdf {
        pages: usize,
        content: Vec<PageText>,
    },
    Image {
        format: String,
        width: u32,
        height: u32,
        color_mode: String,
        /// OCR output, absent when OCR is disabled
        text: Option<String>,
    },
    Excel {
        sheets: Vec<SheetData>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageText {
    pub page: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl StructuredDocument {
    pub fn source_type(&self) -> SourceType {
        match self {
            StructuredDocument::Pdf { .. } => SourceType::Pdf,
            StructuredDocument::Image { .. } => SourceType::Image,
            StructuredDocument::Excel { .. } => SourceType::Excel,
        }
    }

    /// Generic mapping/sequence/scalar form used for sanitization and storage.
    pub fn to_tree(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
