use std::fmt::Debug;

use chrono::NaiveDate;

use super::{HebrewDate, HebrewDateParseError};

/// Gregorian to Hebrew conversion collaborator.
pub trait HebrewCalendarGateway: Debug + Send + Sync {
    /// Hebrew rendering of `date` (day, month, year) in the service's script.
    fn hebrew_date_text(&self, date: NaiveDate) -> Result<String, ConversionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("date conversion service unreachable: {0}")]
    Unreachable(String),
    #[error("date conversion service rejected {date}: {reason}")]
    Rejected { date: NaiveDate, reason: String },
    #[error("unexpected conversion response: {0}")]
    InvalidResponse(String),
    #[error("unparseable Hebrew date '{text}': {source}")]
    Malformed {
        text: String,
        source: HebrewDateParseError,
    },
    #[error("conversion runtime unavailable: {0}")]
    Runtime(String),
}

#[derive(Debug)]
pub struct HebrewDateResolver {
    gateway: Box<dyn HebrewCalendarGateway>,
}

impl HebrewDateResolver {
    pub fn new(gateway: Box<dyn HebrewCalendarGateway>) -> Self {
        Self { gateway }
    }

    pub fn resolve(&self, date: NaiveDate) -> Result<HebrewDate, ConversionError> {
        let text = self.gateway.hebrew_date_text(date)?;
        HebrewDate::parse(&text).map_err(|source| ConversionError::Malformed { text, source })
    }
}
