use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::debug;

use super::normalizer::normalize_header;
use super::parser::parse_records;
use super::{ContactSheet, SheetError};
use crate::workflows::celebrations::{ContactRecord, HebrewCacheUpdate, FIRST_DATA_ROW};

const HEBREW_BIRTH_DATE_HEADER: &str = "Hebrew Birth Date";
const HEBREW_SOURCE_DATE_HEADER: &str = "Hebrew Source Date";

/// Contact table stored as a headered CSV file.
#[derive(Debug, Clone)]
pub struct CsvContactSheet {
    path: PathBuf,
}

impl CsvContactSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SheetError {
        SheetError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ContactSheet for CsvContactSheet {
    fn load(&self) -> Result<Vec<ContactRecord>, SheetError> {
        let file = File::open(&self.path).map_err(|err| self.io_error(err))?;
        Ok(parse_records(file)?)
    }

    fn store_hebrew_birth_dates(&self, updates: &[HebrewCacheUpdate]) -> Result<(), SheetError> {
        if updates.is_empty() {
            return Ok(());
        }

        let file = File::open(&self.path).map_err(|err| self.io_error(err))?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

        let mut headers = reader.headers()?.clone();
        let mut rows = reader.records().collect::<Result<Vec<_>, _>>()?;

        // Unnamed trailing fields keep their place; new columns go after them.
        let widest = rows.iter().map(StringRecord::len).max().unwrap_or(0);
        let hebrew_idx = column_index(&mut headers, HEBREW_BIRTH_DATE_HEADER, widest);
        let source_idx = column_index(&mut headers, HEBREW_SOURCE_DATE_HEADER, widest);

        for update in updates {
            let row = update
                .row
                .checked_sub(FIRST_DATA_ROW)
                .and_then(|idx| rows.get_mut(idx))
                .ok_or(SheetError::UnknownRow(update.row))?;
            set_field(row, hebrew_idx, &update.hebrew_birth_date);
            set_field(
                row,
                source_idx,
                &update.source_date.format("%Y-%m-%d").to_string(),
            );
        }

        let temp = self.temp_path();
        {
            let mut writer = csv::Writer::from_path(&temp)?;
            writer.write_record(&headers)?;
            for row in &rows {
                writer.write_record(&padded(row, headers.len()))?;
            }
            writer.flush().map_err(|err| self.io_error(err))?;
        }
        fs::rename(&temp, &self.path).map_err(|err| self.io_error(err))?;

        debug!(path = %self.path.display(), updated = updates.len(), "stored Hebrew birth dates");
        Ok(())
    }
}

/// Position of `header`. A missing column is appended after the header is
/// padded to `min_width`, so it never lands on data in an unnamed column.
fn column_index(headers: &mut StringRecord, header: &str, min_width: usize) -> usize {
    let wanted = normalize_header(header);
    if let Some(idx) = headers
        .iter()
        .position(|existing| normalize_header(existing) == wanted)
    {
        return idx;
    }
    while headers.len() < min_width {
        headers.push_field("");
    }
    headers.push_field(header);
    headers.len() - 1
}

fn set_field(record: &mut StringRecord, idx: usize, value: &str) {
    let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
    if fields.len() <= idx {
        fields.resize(idx + 1, String::new());
    }
    fields[idx] = value.to_string();
    *record = StringRecord::from(fields);
}

fn padded(record: &StringRecord, len: usize) -> StringRecord {
    let mut fields: Vec<&str> = record.iter().collect();
    if fields.len() < len {
        fields.resize(len, "");
    }
    StringRecord::from(fields)
}
