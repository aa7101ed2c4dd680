//! SMTP Transport

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{Email, MailError, Mailer};

/// SMTP configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Relay host; no host means mail is only logged
    pub smtp_host: Option<String>,
    /// Submission port (STARTTLS)
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address, defaults to the username
    pub from: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: 587,
            username: None,
            password: None,
            from: None,
        }
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .finish()
    }
}

/// Mailer delivering through an SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the relay transport from config
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| MailError::NotConfigured("smtp_host is not set".to_string()))?;
        let sender = config
            .from
            .as_deref()
            .or(config.username.as_deref())
            .ok_or_else(|| MailError::NotConfigured("no sender address".to_string()))?;
        let from: Mailbox = sender.parse()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| MailError::NotConfigured(e.to_string()))?
            .port(config.smtp_port);
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        info!("SMTP mailer ready ({}:{})", host, config.smtp_port);
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let to: Mailbox = email.to.parse()?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))
            .map_err(|e| MailError::Build(e.to_string()))?;

        match self.transport.send(message).await {
            Ok(response) => {
                info!(
                    "Email for \"{}\" sent to {} ({})",
                    email.subject,
                    email.to,
                    response.code()
                );
                Ok(())
            }
            Err(e) => {
                error!("Failed to send email for \"{}\" to {}: {}", email.subject, email.to, e);
                Err(MailError::Delivery(e.to_string()))
            }
        }
    }
}
