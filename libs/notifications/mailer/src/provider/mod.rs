//! Email provider implementations

pub mod mock;
pub mod smtp;

pub use mock::MockProvider;
pub use smtp::SmtpProvider;

use crate::message::EmailMessage;
use async_trait::async_trait;
use eyre::Result;

/// Result of sending an email
#[derive(Debug)]
pub struct SendOutcome {
    /// Provider-specific message id
    pub message_id: String,
}

/// Trait for email transports
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &EmailMessage) -> Result<SendOutcome>;

    fn name(&self) -> &'static str;
}
