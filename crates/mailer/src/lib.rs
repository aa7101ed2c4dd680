//! Outbound Email
//!
//! Transports behind the [`Mailer`] trait:
//! - SMTP relay with STARTTLS and credentials
//! - Log-only outbox for deployments without SMTP (and for tests)
//!
//! Message bodies come from [`templates`].

mod outbox;
mod smtp;
pub mod templates;

pub use outbox::LogMailer;
pub use smtp::{MailConfig, SmtpMailer};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mail error types
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail transport is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Message build failed: {0}")]
    Build(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

impl From<lettre::address::AddressError> for MailError {
    fn from(err: lettre::address::AddressError) -> Self {
        MailError::Address(err.to_string())
    }
}

/// A rendered message with plain-text and HTML alternatives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Delivers rendered emails
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}
