//! Daily birthday, Hebrew birthday and anniversary notifications.

pub mod dispatcher;
pub mod domain;
pub mod hebrew;
mod mailer;
pub mod matcher;
pub mod scanner;
pub mod service;
mod templates;

#[cfg(test)]
mod tests;

pub use dispatcher::{DeliveryError, MailGateway, NotificationDispatcher, OutgoingMail};
pub use domain::{
    ContactField, ContactRecord, EventKind, HebrewCacheUpdate, MissingFieldError,
    NotificationEvent, Occasion, RenderedMessage, FIRST_DATA_ROW,
};
pub use hebrew::{
    ConversionError, HebcalClient, HebrewCalendarGateway, HebrewDate, HebrewDateParseError,
    HebrewDateResolver, DEFAULT_HEBCAL_URL,
};
pub use mailer::SmtpMailer;
pub use matcher::{is_same_month_day, years_between};
pub use scanner::{RecordError, RecordScanner, ScanIssue, ScanReport};
pub use service::{BackfillSummary, CelebrationError, CelebrationService, DeliveryFailure, RunSummary};
