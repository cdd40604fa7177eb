use chrono::NaiveDate;
use std::fmt;

use super::hebrew::HebrewDate;
use super::templates;

/// Sheet row number of the first data row (row 1 holds the headers).
pub const FIRST_DATA_ROW: usize = 2;

/// One contact row as read from the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub row: usize,
    pub name: String,
    pub gregorian_birth_date: Option<NaiveDate>,
    /// Cached service rendering of the birth date, e.g. `ה׳ בְּאָב תש״ן`.
    pub hebrew_birth_date: Option<String>,
    /// Gregorian date the cached Hebrew birth date was derived from.
    pub hebrew_source_date: Option<NaiveDate>,
    pub past_event_date: Option<NaiveDate>,
    pub recipients: Vec<String>,
}

impl ContactRecord {
    pub fn new(row: usize, name: impl Into<String>) -> Self {
        Self {
            row,
            name: name.into(),
            gregorian_birth_date: None,
            hebrew_birth_date: None,
            hebrew_source_date: None,
            past_event_date: None,
            recipients: Vec::new(),
        }
    }

    /// The cached Hebrew birth date, when it parses and still belongs to the
    /// current Gregorian birth date. Sheets without a source column are trusted.
    pub fn cached_hebrew_birth_date(&self) -> Option<HebrewDate> {
        let text = self.hebrew_birth_date.as_deref()?;
        if let (Some(source), Some(birth)) = (self.hebrew_source_date, self.gregorian_birth_date) {
            if source != birth {
                return None;
            }
        }
        HebrewDate::parse(text).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Birthday,
    Anniversary,
    HebrewBirthday,
}

impl EventKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Birthday => "Birthday",
            Self::Anniversary => "Anniversary",
            Self::HebrewBirthday => "Hebrew Birthday",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What matched today, with the date the message refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occasion {
    Birthday { birth_date: NaiveDate },
    Anniversary { event_date: NaiveDate },
    HebrewBirthday { hebrew_birth_date: String },
}

impl Occasion {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Birthday { .. } => EventKind::Birthday,
            Self::Anniversary { .. } => EventKind::Anniversary,
            Self::HebrewBirthday { .. } => EventKind::HebrewBirthday,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

/// A notification due today. Lives for a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub row: usize,
    pub occasion: Occasion,
    pub subject_name: String,
    pub computed_years: u32,
    pub target_emails: Vec<String>,
    pub message: RenderedMessage,
}

impl NotificationEvent {
    pub fn new(record: &ContactRecord, occasion: Occasion, computed_years: u32) -> Self {
        let message = templates::render(&occasion, &record.name, computed_years);
        Self {
            row: record.row,
            occasion,
            subject_name: record.name.clone(),
            computed_years,
            target_emails: record.recipients.clone(),
            message,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.occasion.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    GregorianBirthDate,
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Name => "a name",
            Self::GregorianBirthDate => "a birth date",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record is missing {field}")]
pub struct MissingFieldError {
    pub field: ContactField,
}

/// A freshly resolved Hebrew birth date to write back into the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HebrewCacheUpdate {
    pub row: usize,
    pub hebrew_birth_date: String,
    pub source_date: NaiveDate,
}
