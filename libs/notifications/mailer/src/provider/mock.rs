//! Mock email provider for tests

use super::{EmailProvider, SendOutcome};
use crate::message::EmailMessage;
use async_trait::async_trait;
use eyre::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mock provider that captures sent emails instead of delivering them.
#[derive(Clone, Default)]
pub struct MockProvider {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    should_fail: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that fails every send.
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            should_fail: true,
        }
    }

    pub async fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent.lock().await.iter().any(|e| e.to == email)
    }
}

#[async_trait]
impl EmailProvider for MockProvider {
    async fn send(&self, email: &EmailMessage) -> Result<SendOutcome> {
        if self.should_fail {
            return Err(eyre::eyre!("mock transport failure"));
        }

        self.sent.lock().await.push(email.clone());

        Ok(SendOutcome {
            message_id: format!("mock-{}", email.id),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_sent_emails() {
        let provider = MockProvider::new();
        let email = EmailMessage::new("test@example.com", "Subject", "Body");

        provider.send(&email).await.unwrap();

        assert_eq!(provider.sent_count().await, 1);
        assert!(provider.was_sent_to("test@example.com").await);
        assert!(!provider.was_sent_to("other@example.com").await);
    }

    #[tokio::test]
    async fn failing_mock_errors() {
        let provider = MockProvider::failing();
        let email = EmailMessage::new("test@example.com", "Subject", "Body");

        assert!(provider.send(&email).await.is_err());
        assert_eq!(provider.sent_count().await, 0);
    }
}
