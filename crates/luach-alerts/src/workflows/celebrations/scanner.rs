use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::domain::{
    ContactField, ContactRecord, HebrewCacheUpdate, MissingFieldError, NotificationEvent,
    Occasion,
};
use super::hebrew::{ConversionError, HebrewDate, HebrewDateResolver};
use super::matcher::{is_same_month_day, years_between};

/// Why a record (or the whole Hebrew pass, when `row` is `None`) was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanIssue {
    pub row: Option<usize>,
    pub name: Option<String>,
    pub error: RecordError,
}

impl ScanIssue {
    fn record(record: &ContactRecord, error: impl Into<RecordError>) -> Self {
        Self {
            row: Some(record.row),
            name: Some(record.name.clone()).filter(|name| !name.is_empty()),
            error: error.into(),
        }
    }

    fn batch(error: impl Into<RecordError>) -> Self {
        Self {
            row: None,
            name: None,
            error: error.into(),
        }
    }
}

/// Outcome of one pass over the contact sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub records_scanned: usize,
    /// Events in sheet order; within a row: birthday, anniversary, Hebrew birthday.
    pub events: Vec<NotificationEvent>,
    pub cache_updates: Vec<HebrewCacheUpdate>,
    pub issues: Vec<ScanIssue>,
    pub today_hebrew: Option<String>,
}

/// Single linear pass deciding which notifications are due today.
#[derive(Debug)]
pub struct RecordScanner<'a> {
    resolver: &'a HebrewDateResolver,
    hebrew_matching: bool,
}

impl<'a> RecordScanner<'a> {
    pub fn new(resolver: &'a HebrewDateResolver) -> Self {
        Self {
            resolver,
            hebrew_matching: true,
        }
    }

    pub fn with_hebrew_matching(mut self, enabled: bool) -> Self {
        self.hebrew_matching = enabled;
        self
    }

    pub fn scan(&self, records: &[ContactRecord], today: NaiveDate) -> ScanReport {
        let mut report = ScanReport {
            records_scanned: records.len(),
            ..ScanReport::default()
        };

        let today_hebrew = self.resolve_today(records, today, &mut report);

        for record in records {
            self.scan_record(record, today, today_hebrew.as_ref(), &mut report);
        }

        report
    }

    fn resolve_today(
        &self,
        records: &[ContactRecord],
        today: NaiveDate,
        report: &mut ScanReport,
    ) -> Option<HebrewDate> {
        let needed = self.hebrew_matching
            && records
                .iter()
                .any(|record| record.gregorian_birth_date.is_some());
        if !needed {
            return None;
        }

        match self.resolver.resolve(today) {
            Ok(date) => {
                info!(
                    %today,
                    hebrew = %date,
                    day_month = date.day_month_text(),
                    "resolved today's Hebrew date"
                );
                report.today_hebrew = Some(date.as_text().to_string());
                Some(date)
            }
            Err(error) => {
                warn!(%today, %error, "cannot resolve today's Hebrew date; skipping Hebrew birthdays");
                report.issues.push(ScanIssue::batch(error));
                None
            }
        }
    }

    fn scan_record(
        &self,
        record: &ContactRecord,
        today: NaiveDate,
        today_hebrew: Option<&HebrewDate>,
        report: &mut ScanReport,
    ) {
        if record.name.trim().is_empty() {
            debug!(row = record.row, "skipping row without a name");
            report.issues.push(ScanIssue::record(
                record,
                MissingFieldError {
                    field: ContactField::Name,
                },
            ));
            return;
        }

        let Some(birth_date) = record.gregorian_birth_date else {
            debug!(row = record.row, name = %record.name, "no birth date on record");
            report.issues.push(ScanIssue::record(
                record,
                MissingFieldError {
                    field: ContactField::GregorianBirthDate,
                },
            ));
            self.check_anniversary(record, today, report);
            return;
        };

        if is_same_month_day(today, birth_date) {
            let age = years_between(birth_date, today);
            if let Ok(age) = u32::try_from(age) {
                report.events.push(NotificationEvent::new(
                    record,
                    Occasion::Birthday { birth_date },
                    age,
                ));
            }
        }

        self.check_anniversary(record, today, report);

        if let Some(today_hebrew) = today_hebrew {
            self.check_hebrew_birthday(record, birth_date, today, today_hebrew, report);
        }
    }

    fn check_anniversary(&self, record: &ContactRecord, today: NaiveDate, report: &mut ScanReport) {
        let Some(event_date) = record.past_event_date else {
            return;
        };
        if !is_same_month_day(today, event_date) {
            return;
        }

        let years = years_between(event_date, today);
        if years > 0 {
            report.events.push(NotificationEvent::new(
                record,
                Occasion::Anniversary { event_date },
                years.unsigned_abs(),
            ));
        }
    }

    fn check_hebrew_birthday(
        &self,
        record: &ContactRecord,
        birth_date: NaiveDate,
        today: NaiveDate,
        today_hebrew: &HebrewDate,
        report: &mut ScanReport,
    ) {
        let Some(hebrew_birth_date) = self.hebrew_birth_date(record, birth_date, report) else {
            return;
        };
        if !hebrew_birth_date.same_day_month(today_hebrew) {
            return;
        }

        // Age follows the Gregorian birth date.
        let age = years_between(birth_date, today);
        if let Ok(age) = u32::try_from(age) {
            report.events.push(NotificationEvent::new(
                record,
                Occasion::HebrewBirthday {
                    hebrew_birth_date: hebrew_birth_date.as_text().to_string(),
                },
                age,
            ));
        }
    }

    fn hebrew_birth_date(
        &self,
        record: &ContactRecord,
        birth_date: NaiveDate,
        report: &mut ScanReport,
    ) -> Option<HebrewDate> {
        if let Some(cached) = record.cached_hebrew_birth_date() {
            return Some(cached);
        }

        match self.resolver.resolve(birth_date) {
            Ok(date) => {
                debug!(row = record.row, name = %record.name, hebrew = %date, "resolved Hebrew birth date");
                report.cache_updates.push(HebrewCacheUpdate {
                    row: record.row,
                    hebrew_birth_date: date.as_text().to_string(),
                    source_date: birth_date,
                });
                Some(date)
            }
            Err(error) => {
                warn!(row = record.row, name = %record.name, %error, "error converting birth date");
                report.issues.push(ScanIssue::record(record, error));
                None
            }
        }
    }
}
