//! Log-only Transport

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::info;

use crate::{Email, MailError, Mailer};

/// Mailer that logs each message and keeps the most recent ones in memory
pub struct LogMailer {
    outbox: Mutex<VecDeque<Email>>,
    max_retained: usize,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::with_retention(100)
    }

    /// Keep at most `max_retained` messages
    pub fn with_retention(max_retained: usize) -> Self {
        Self {
            outbox: Mutex::new(VecDeque::with_capacity(max_retained.min(1024))),
            max_retained,
        }
    }

    /// Retained messages, oldest first
    pub fn sent(&self) -> Vec<Email> {
        self.outbox
            .lock()
            .map(|o| o.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of retained messages
    pub fn sent_count(&self) -> usize {
        self.outbox.lock().map(|o| o.len()).unwrap_or(0)
    }
}

impl Default for LogMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        info!(
            "Email for \"{}\" to {} kept in log outbox (no SMTP relay)",
            email.subject, email.to
        );

        let mut outbox = self
            .outbox
            .lock()
            .map_err(|e| MailError::Delivery(format!("Lock error: {}", e)))?;
        // Enforce retention
        while outbox.len() >= self.max_retained.max(1) {
            outbox.pop_front();
        }
        outbox.push_back(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(n: usize) -> Email {
        Email {
            to: format!("user{}@example.com", n),
            subject: "Hello".to_string(),
            text: "text".to_string(),
            html: "<p>html</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_records_messages() {
        let mailer = LogMailer::new();
        mailer.send(email(1)).await.unwrap();
        mailer.send(email(2)).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "user1@example.com");
    }

    #[tokio::test]
    async fn test_retention_limit() {
        let mailer = LogMailer::with_retention(3);
        for n in 0..10 {
            mailer.send(email(n)).await.unwrap();
        }
        assert_eq!(mailer.sent_count(), 3);
        assert_eq!(mailer.sent()[0].to, "user7@example.com");
    }
}
