use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::dispatcher::{DeliveryError, NotificationDispatcher};
use super::domain::{EventKind, HebrewCacheUpdate};
use super::hebrew::HebrewDateResolver;
use super::scanner::{RecordScanner, ScanIssue, ScanReport};
use crate::contacts::{ContactSheet, SheetError};

/// Send attempt that failed; the remaining events were still attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub row: usize,
    pub name: String,
    pub kind: EventKind,
    pub error: DeliveryError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub today: NaiveDate,
    pub today_hebrew: Option<String>,
    pub records_scanned: usize,
    pub events: usize,
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
    pub issues: Vec<ScanIssue>,
    pub cache_updates: usize,
    pub cache_persisted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    pub converted: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failures: Vec<ScanIssue>,
}

#[derive(Debug, thiserror::Error)]
pub enum CelebrationError {
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

/// Composes the contact sheet, Hebrew date resolver and dispatcher into the
/// daily run and the Hebrew date backfill.
#[derive(Debug)]
pub struct CelebrationService<S> {
    sheet: Arc<S>,
    resolver: HebrewDateResolver,
    dispatcher: NotificationDispatcher,
    hebrew_matching: bool,
}

impl<S> CelebrationService<S>
where
    S: ContactSheet + 'static,
{
    pub fn new(
        sheet: Arc<S>,
        resolver: HebrewDateResolver,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            sheet,
            resolver,
            dispatcher,
            hebrew_matching: true,
        }
    }

    pub fn with_hebrew_matching(mut self, enabled: bool) -> Self {
        self.hebrew_matching = enabled;
        self
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// Scan without sending anything or touching the sheet.
    pub fn preview(&self, today: NaiveDate) -> Result<ScanReport, CelebrationError> {
        let records = self.sheet.load()?;
        Ok(RecordScanner::new(&self.resolver)
            .with_hebrew_matching(self.hebrew_matching)
            .scan(&records, today))
    }

    /// Scan the sheet, cache new Hebrew dates and send every due notification.
    pub fn run_daily(&self, today: NaiveDate) -> Result<RunSummary, CelebrationError> {
        let records = self.sheet.load()?;
        info!(%today, records = records.len(), "scanning contact sheet");

        let report = RecordScanner::new(&self.resolver)
            .with_hebrew_matching(self.hebrew_matching)
            .scan(&records, today);

        let cache_persisted = self.persist_cache(&report.cache_updates);

        if report.events.is_empty() {
            info!(
                %today,
                hebrew = report.today_hebrew.as_deref().unwrap_or("unresolved"),
                "no matches found for today"
            );
        }

        let mut delivered = 0;
        let mut failures = Vec::new();
        for event in &report.events {
            match self.dispatcher.dispatch(event) {
                Ok(()) => delivered += 1,
                Err(error) => {
                    warn!(row = event.row, name = %event.subject_name, kind = %event.kind(), %error, "notification failed");
                    failures.push(DeliveryFailure {
                        row: event.row,
                        name: event.subject_name.clone(),
                        kind: event.kind(),
                        error,
                    });
                }
            }
        }

        Ok(RunSummary {
            today,
            today_hebrew: report.today_hebrew,
            records_scanned: report.records_scanned,
            events: report.events.len(),
            delivered,
            failures,
            issues: report.issues,
            cache_updates: report.cache_updates.len(),
            cache_persisted,
        })
    }

    /// Resolve and store Hebrew birth dates for rows whose cache is missing or
    /// stale, or for every dated row when `force` is set.
    pub fn backfill_hebrew_dates(&self, force: bool) -> Result<BackfillSummary, CelebrationError> {
        let records = self.sheet.load()?;
        let mut summary = BackfillSummary::default();
        let mut updates = Vec::new();

        for record in &records {
            let Some(birth_date) = record.gregorian_birth_date else {
                summary.skipped += 1;
                continue;
            };
            if !force && record.cached_hebrew_birth_date().is_some() {
                summary.unchanged += 1;
                continue;
            }

            match self.resolver.resolve(birth_date) {
                Ok(hebrew) => {
                    info!(row = record.row, name = %record.name, %hebrew, "converted birth date");
                    updates.push(HebrewCacheUpdate {
                        row: record.row,
                        hebrew_birth_date: hebrew.as_text().to_string(),
                        source_date: birth_date,
                    });
                }
                Err(error) => {
                    warn!(row = record.row, name = %record.name, %error, "error converting birth date");
                    summary.failures.push(ScanIssue {
                        row: Some(record.row),
                        name: Some(record.name.clone()),
                        error: error.into(),
                    });
                }
            }
        }

        self.sheet.store_hebrew_birth_dates(&updates)?;
        summary.converted = updates.len();
        Ok(summary)
    }

    fn persist_cache(&self, updates: &[HebrewCacheUpdate]) -> bool {
        if updates.is_empty() {
            return true;
        }
        match self.sheet.store_hebrew_birth_dates(updates) {
            Ok(()) => true,
            Err(error) => {
                warn!(updates = updates.len(), %error, "could not cache Hebrew birth dates");
                false
            }
        }
    }
}
