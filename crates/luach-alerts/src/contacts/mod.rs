//! Spreadsheet collaborator: the contact table and its Hebrew date cache.

mod csv_sheet;
mod normalizer;
mod parser;

pub use csv_sheet::CsvContactSheet;
pub use normalizer::{parse_sheet_date, split_recipients};
pub use parser::parse_records;

use crate::workflows::celebrations::{ContactRecord, HebrewCacheUpdate};

/// Storage abstraction so the celebration workflow can run against any table.
pub trait ContactSheet: Send + Sync {
    /// Every data row, header excluded, in sheet order.
    fn load(&self) -> Result<Vec<ContactRecord>, SheetError>;
    /// Write derived Hebrew birth dates back into their rows.
    fn store_hebrew_birth_dates(&self, updates: &[HebrewCacheUpdate]) -> Result<(), SheetError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("failed to access contact sheet {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid contact sheet data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {0} does not exist in the contact sheet")]
    UnknownRow(usize),
}
