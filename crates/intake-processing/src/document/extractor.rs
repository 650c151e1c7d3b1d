//! PDF text extraction

use anyhow::Result;
use intake_core::models::PageText;

pub struct PdfExtractor;

impl PdfExtractor {
    /// Text of every page, numbered from 1.
    ///
    /// Pages without a text layer yield an empty string rather than being skipped,
    /// so `pages.len()` always equals the page count.
    pub fn extract_pages(data: &[u8]) -> Result<Vec<PageText>> {
        if !data.starts_with(b"%PDF") {
            anyhow::bail!("Missing PDF header");
        }

        let pages = pdf_extract::extract_text_from_mem_by_pages(data)
            .map_err(|e| anyhow::anyhow!("Failed to extract PDF text: {}", e))?;

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(index, text)| PageText {
                page: index + 1,
                text: text.trim().to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_pdf;

    #[test]
    fn test_extract_pages_numbers_from_one() {
        let pages = PdfExtractor::extract_pages(&sample_pdf()).unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page, 1);
        assert!(pages[0].text.contains("Hello"));
    }

    #[test]
    fn test_extract_pages_rejects_non_pdf() {
        assert!(PdfExtractor::extract_pages(b"PK\x03\x04 not a pdf").is_err());
    }
}
