//! Spreadsheet extraction (xlsx, xlsm, xlsb, xls, ods)

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use intake_core::models::SheetData;
use std::path::Path;

pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    /// Every sheet in workbook order, each cell rendered as text. Empty cells
    /// become empty strings so rows keep their column positions.
    pub fn extract_sheets(path: &Path) -> Result<Vec<SheetData>> {
        let mut workbook = open_workbook_auto(path).context("Failed to open workbook")?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .with_context(|| format!("Failed to read sheet '{}'", name))?;

            let rows = range
                .rows()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();

            sheets.push(SheetData { name, rows });
        }

        Ok(sheets)
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
