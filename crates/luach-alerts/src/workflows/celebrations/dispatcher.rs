use std::fmt::Debug;

use tracing::info;

use super::domain::NotificationEvent;

/// A message ready for the mail collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Outbound mail collaborator.
pub trait MailGateway: Debug + Send + Sync {
    fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid mail address '{0}'")]
    InvalidAddress(String),
    #[error("could not build message: {0}")]
    Message(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
    #[error("mail runtime unavailable: {0}")]
    Runtime(String),
}

/// Sends one mail per event to the operator plus the record's recipients.
/// No retries; a failed send is returned to the caller.
#[derive(Debug)]
pub struct NotificationDispatcher {
    mailer: Box<dyn MailGateway>,
    operator_address: String,
}

impl NotificationDispatcher {
    pub fn new(mailer: Box<dyn MailGateway>, operator_address: impl Into<String>) -> Self {
        Self {
            mailer,
            operator_address: operator_address.into(),
        }
    }

    pub fn operator_address(&self) -> &str {
        &self.operator_address
    }

    /// Operator first, then the record's list without repeats.
    pub fn recipients_for(&self, event: &NotificationEvent) -> Vec<String> {
        let mut recipients = vec![self.operator_address.clone()];
        for address in &event.target_emails {
            let duplicate = recipients
                .iter()
                .any(|known| known.eq_ignore_ascii_case(address));
            if !duplicate {
                recipients.push(address.clone());
            }
        }
        recipients
    }

    pub fn compose(&self, event: &NotificationEvent) -> OutgoingMail {
        OutgoingMail {
            recipients: self.recipients_for(event),
            subject: event.message.subject.clone(),
            body: event.message.body.clone(),
        }
    }

    pub fn dispatch(&self, event: &NotificationEvent) -> Result<(), DeliveryError> {
        let mail = self.compose(event);
        self.mailer.send(&mail)?;
        info!(
            row = event.row,
            name = %event.subject_name,
            kind = %event.kind(),
            years = event.computed_years,
            recipients = %mail.recipients.join(","),
            "notification sent"
        );
        Ok(())
    }
}
