use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::contacts::{ContactSheet, SheetError};
use crate::workflows::celebrations::{
    ContactRecord, ConversionError, DeliveryError, HebrewCacheUpdate, HebrewCalendarGateway,
    HebrewDateResolver, MailGateway, NotificationDispatcher, OutgoingMail,
};

pub(super) const OPERATOR: &str = "operator@example.com";

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn contact(row: usize, name: &str) -> ContactRecord {
    let mut record = ContactRecord::new(row, name);
    record.recipients = vec![format!("{}@family.example.com", name.to_lowercase())];
    record
}

pub(super) fn born(row: usize, name: &str, birth: NaiveDate) -> ContactRecord {
    let mut record = contact(row, name);
    record.gregorian_birth_date = Some(birth);
    record
}

/// Conversion service answering from fixtures and recording every request.
#[derive(Debug, Default)]
pub(super) struct FakeCalendar {
    dates: HashMap<NaiveDate, String>,
    failing: HashSet<NaiveDate>,
    calls: Arc<Mutex<Vec<NaiveDate>>>,
}

impl FakeCalendar {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn with(mut self, date: NaiveDate, hebrew: &str) -> Self {
        self.dates.insert(date, hebrew.to_string());
        self
    }

    pub(super) fn failing(mut self, date: NaiveDate) -> Self {
        self.failing.insert(date);
        self
    }

    pub(super) fn calls(&self) -> Arc<Mutex<Vec<NaiveDate>>> {
        self.calls.clone()
    }

    pub(super) fn into_resolver(self) -> HebrewDateResolver {
        HebrewDateResolver::new(Box::new(self))
    }
}

impl HebrewCalendarGateway for FakeCalendar {
    fn hebrew_date_text(&self, date: NaiveDate) -> Result<String, ConversionError> {
        self.calls.lock().expect("calls mutex").push(date);
        if self.failing.contains(&date) {
            return Err(ConversionError::Unreachable("connection reset".to_string()));
        }
        self.dates
            .get(&date)
            .cloned()
            .ok_or_else(|| ConversionError::Unreachable(format!("no fixture for {date}")))
    }
}

/// Mailer keeping every message; fails sends that include `fail_for`.
#[derive(Debug, Default, Clone)]
pub(super) struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
    fail_for: Option<String>,
}

impl RecordingMailer {
    pub(super) fn failing_for(address: &str) -> Self {
        Self {
            fail_for: Some(address.to_string()),
            ..Self::default()
        }
    }

    pub(super) fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().expect("mail mutex").clone()
    }

    pub(super) fn dispatcher(&self) -> NotificationDispatcher {
        NotificationDispatcher::new(Box::new(self.clone()), OPERATOR)
    }
}

impl MailGateway for RecordingMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        if let Some(address) = &self.fail_for {
            if mail.recipients.iter().any(|r| r == address) {
                return Err(DeliveryError::Transport("550 mailbox unavailable".to_string()));
            }
        }
        self.sent.lock().expect("mail mutex").push(mail.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(super) struct MemorySheet {
    records: Mutex<Vec<ContactRecord>>,
    stored: Mutex<Vec<HebrewCacheUpdate>>,
    reject_writes: bool,
}

impl MemorySheet {
    pub(super) fn new(records: Vec<ContactRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub(super) fn read_only(records: Vec<ContactRecord>) -> Self {
        Self {
            reject_writes: true,
            ..Self::new(records)
        }
    }

    pub(super) fn stored(&self) -> Vec<HebrewCacheUpdate> {
        self.stored.lock().expect("sheet mutex").clone()
    }

    pub(super) fn record(&self, row: usize) -> Option<ContactRecord> {
        self.records
            .lock()
            .expect("sheet mutex")
            .iter()
            .find(|record| record.row == row)
            .cloned()
    }
}

impl ContactSheet for MemorySheet {
    fn load(&self) -> Result<Vec<ContactRecord>, SheetError> {
        Ok(self.records.lock().expect("sheet mutex").clone())
    }

    fn store_hebrew_birth_dates(&self, updates: &[HebrewCacheUpdate]) -> Result<(), SheetError> {
        if self.reject_writes && !updates.is_empty() {
            return Err(SheetError::Io {
                path: "memory".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only"),
            });
        }

        let mut records = self.records.lock().expect("sheet mutex");
        for update in updates {
            let record = records
                .iter_mut()
                .find(|record| record.row == update.row)
                .ok_or(SheetError::UnknownRow(update.row))?;
            record.hebrew_birth_date = Some(update.hebrew_birth_date.clone());
            record.hebrew_source_date = Some(update.source_date);
        }
        self.stored
            .lock()
            .expect("sheet mutex")
            .extend(updates.iter().cloned());
        Ok(())
    }
}
