//! High-level mail service used by the accounts domain.

use crate::message::EmailMessage;
use crate::provider::EmailProvider;
use core_config::mail::MailConfig;
use eyre::Result;
use std::sync::Arc;
use tracing::info;

/// Builds and dispatches account-related emails through a provider.
#[derive(Clone)]
pub struct MailerService {
    provider: Arc<dyn EmailProvider>,
    config: MailConfig,
}

impl MailerService {
    pub fn new(provider: Arc<dyn EmailProvider>, config: MailConfig) -> Self {
        Self { provider, config }
    }

    /// The reset link embedded in password-reset emails.
    pub fn password_reset_url(&self, uidb64: &str, token: &str) -> String {
        format!(
            "{}/reset-password/{}/{}",
            self.config.frontend_url.trim_end_matches('/'),
            uidb64,
            token
        )
    }

    /// Send the password-reset email for an existing account.
    pub async fn send_password_reset(
        &self,
        to: &str,
        full_name: &str,
        uidb64: &str,
        token: &str,
    ) -> Result<()> {
        let reset_url = self.password_reset_url(uidb64, token);

        let greeting = if full_name.is_empty() { "there" } else { full_name };
        let body = format!(
            "Hi {greeting},\n\n\
             We received a request to reset the password for your account.\n\
             Use the link below to choose a new password:\n\n\
             {reset_url}\n\n\
             If you did not request a password reset, you can ignore this email.\n"
        );

        let email = EmailMessage::new(to, "Password reset request", body);
        let outcome = self.provider.send(&email).await?;

        info!(
            to = %to,
            provider = self.provider.name(),
            message_id = %outcome.message_id,
            "Password reset email dispatched"
        );

        Ok(())
    }
}
