use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::runtime::Runtime;
use tracing::warn;

use super::dispatcher::{DeliveryError, MailGateway, OutgoingMail};
use crate::config::{SmtpConfig, SmtpSecurity};

/// SMTP delivery through lettre's async transport, driven by an owned runtime
/// so the dispatcher can stay synchronous.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    runtime: Runtime,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let from = parse_mailbox(&config.from)?;
        let runtime = Runtime::new().map_err(|err| DeliveryError::Runtime(err.to_string()))?;

        let builder = match config.security {
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .map_err(SmtpMailer::map_error)?
            }
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(SmtpMailer::map_error)?,
            SmtpSecurity::Plain => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
        };

        let mut builder = builder.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        // The connection pool spawns onto the ambient runtime.
        let transport = {
            let _guard = runtime.enter();
            builder.build()
        };

        Ok(Self {
            transport,
            from,
            runtime,
        })
    }

    fn map_error<E: std::fmt::Display>(err: E) -> DeliveryError {
        DeliveryError::Transport(err.to_string())
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl MailGateway for SmtpMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let message = build_message(&self.from, mail)?;
        self.runtime
            .block_on(self.transport.send(message))
            .map(|_| ())
            .map_err(SmtpMailer::map_error)
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, DeliveryError> {
    raw.trim()
        .parse::<Mailbox>()
        .map_err(|_| DeliveryError::InvalidAddress(raw.to_string()))
}

pub(crate) fn build_message(from: &Mailbox, mail: &OutgoingMail) -> Result<Message, DeliveryError> {
    let mut builder = Message::builder()
        .from(from.clone())
        .subject(mail.subject.clone());

    let mut accepted = 0;
    for recipient in &mail.recipients {
        match parse_mailbox(recipient) {
            Ok(mailbox) => {
                builder = builder.to(mailbox);
                accepted += 1;
            }
            Err(_) => warn!(recipient = %recipient, "skipping unparseable recipient"),
        }
    }
    if accepted == 0 {
        return Err(DeliveryError::InvalidAddress(mail.recipients.join(",")));
    }

    builder
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body.clone())
        .map_err(|err| DeliveryError::Message(err.to_string()))
}
