use super::normalizer::{normalize_header, parse_sheet_date, split_recipients};
use crate::workflows::celebrations::{ContactRecord, FIRST_DATA_ROW};
use csv::StringRecord;
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// Reads a headered contact table. Header names are matched case-insensitively;
/// rows with every field blank are dropped but still count toward row numbers.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<ContactRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: StringRecord = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut records = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let row: ContactRow = record.deserialize(Some(&headers))?;
        records.push(row.into_record(FIRST_DATA_ROW + idx));
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ContactRow {
    #[serde(rename = "name", default)]
    name: String,
    #[serde(
        rename = "birth date",
        alias = "gregorian birth date",
        alias = "birthdate",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    birth_date: Option<String>,
    #[serde(
        rename = "past event date",
        alias = "anniversary date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    past_event_date: Option<String>,
    #[serde(
        rename = "hebrew birth date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    hebrew_birth_date: Option<String>,
    #[serde(
        rename = "hebrew source date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    hebrew_source_date: Option<String>,
    #[serde(rename = "recipients", alias = "email list", default)]
    recipients: String,
}

impl ContactRow {
    fn into_record(self, row: usize) -> ContactRecord {
        ContactRecord {
            row,
            name: self.name,
            gregorian_birth_date: self.birth_date.as_deref().and_then(parse_sheet_date),
            hebrew_birth_date: self.hebrew_birth_date,
            hebrew_source_date: self.hebrew_source_date.as_deref().and_then(parse_sheet_date),
            past_event_date: self.past_event_date.as_deref().and_then(parse_sheet_date),
            recipients: split_recipients(&self.recipients),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
