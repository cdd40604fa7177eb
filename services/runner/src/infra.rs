use chrono::NaiveDate;
use luach_alerts::config::{AppConfig, ConfigError};
use luach_alerts::contacts::CsvContactSheet;
use luach_alerts::error::AppError;
use luach_alerts::schedule::{JsonTriggerRegistry, ScheduleManager};
use luach_alerts::workflows::celebrations::{
    CelebrationService, DeliveryError, HebcalClient, HebrewDateResolver, MailGateway,
    NotificationDispatcher, OutgoingMail, SmtpMailer,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Records mail instead of sending it; used for `--dry-run`.
#[derive(Debug, Default, Clone)]
pub(crate) struct LogMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl LogMailer {
    #[cfg(test)]
    pub(crate) fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().expect("mail mutex poisoned").clone()
    }
}

impl MailGateway for LogMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        info!(
            recipients = %mail.recipients.join(","),
            subject = %mail.subject,
            "dry run: notification not sent"
        );
        self.sent
            .lock()
            .map_err(|err| DeliveryError::Runtime(err.to_string()))?
            .push(mail.clone());
        Ok(())
    }
}

pub(crate) fn contact_sheet(config: &AppConfig, path: Option<PathBuf>) -> Arc<CsvContactSheet> {
    let path = path.unwrap_or_else(|| config.contacts.path.clone());
    Arc::new(CsvContactSheet::new(path))
}

pub(crate) fn hebrew_resolver(config: &AppConfig) -> Result<HebrewDateResolver, AppError> {
    let client = HebcalClient::with_runtime(config.hebcal.base_url.clone(), config.hebcal.timeout())?;
    Ok(HebrewDateResolver::new(Box::new(client)))
}

pub(crate) fn mailer(config: &AppConfig, dry_run: bool) -> Result<Box<dyn MailGateway>, AppError> {
    if dry_run {
        return Ok(Box::new(LogMailer::default()));
    }

    let smtp = config
        .smtp
        .as_ref()
        .ok_or(ConfigError::MissingVar("SMTP_HOST"))?;
    Ok(Box::new(SmtpMailer::from_config(smtp)?))
}

pub(crate) fn celebration_service(
    config: &AppConfig,
    contacts: Option<PathBuf>,
    dry_run: bool,
) -> Result<CelebrationService<CsvContactSheet>, AppError> {
    let dispatcher = NotificationDispatcher::new(
        mailer(config, dry_run)?,
        config.operator_address()?,
    );
    Ok(CelebrationService::new(
        contact_sheet(config, contacts),
        hebrew_resolver(config)?,
        dispatcher,
    ))
}

/// Backfill never sends mail, so it does not need an operator or SMTP.
pub(crate) fn backfill_service(
    config: &AppConfig,
    contacts: Option<PathBuf>,
) -> Result<CelebrationService<CsvContactSheet>, AppError> {
    let operator = config.notifications.operator_address.clone().unwrap_or_default();
    Ok(CelebrationService::new(
        contact_sheet(config, contacts),
        hebrew_resolver(config)?,
        NotificationDispatcher::new(Box::new(LogMailer::default()), operator),
    ))
}

pub(crate) fn schedule_manager(config: &AppConfig) -> ScheduleManager<JsonTriggerRegistry> {
    ScheduleManager::new(JsonTriggerRegistry::new(
        config.schedule.registry_path.clone(),
    ))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
