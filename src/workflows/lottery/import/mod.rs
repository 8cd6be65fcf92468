//! Spreadsheet importers (CSV or XLSX) for residents and parking spots.

mod fields;
pub mod residents;
pub mod spots;
mod table;

pub use residents::{
    ResidentDraft, ResidentImport, ResidentImportError, ResidentImporter, RESIDENT_HEADERS,
};
pub use spots::{
    generate_spots, SkippedRow, SpotImport, SpotImportError, SpotImporter, DETAILED_HEADERS,
    SECTION_HEADERS,
};
pub use table::SheetError;

/// Validation failure tied to a spreadsheet row. Data rows start at 2.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, thiserror::Error)]
#[error("row {row}: {message}")]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

impl RowError {
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}
