//! SMTP transport using lettre

use super::{EmailProvider, SendOutcome};
use crate::message::EmailMessage;
use async_trait::async_trait;
use core_config::mail::{MailConfig, SmtpConfig};
use eyre::{Result, WrapErr};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// SMTP email provider
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
    from_name: String,
}

impl SmtpProvider {
    pub fn new(smtp: &SmtpConfig, mail: &MailConfig) -> Result<Self> {
        let transport = if smtp.use_tls {
            let creds = Credentials::new(smtp.username.clone(), smtp.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
                .wrap_err("Failed to create SMTP relay")?
                .credentials(creds)
                .port(smtp.port)
                .build()
        } else if !smtp.username.is_empty() {
            let creds = Credentials::new(smtp.username.clone(), smtp.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                .credentials(creds)
                .port(smtp.port)
                .build()
        } else {
            // No auth (Mailpit/Mailhog)
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                .port(smtp.port)
                .build()
        };

        Ok(Self {
            transport,
            from_email: mail.from_email.clone(),
            from_name: mail.from_name.clone(),
        })
    }

    fn build_message(&self, email: &EmailMessage) -> Result<Message> {
        let from: Mailbox = format!("{} <{}>", self.from_name, self.from_email)
            .parse()
            .wrap_err("Invalid from address")?;
        let to: Mailbox = email.to.parse().wrap_err("Invalid to address")?;

        let builder = Message::builder().from(from).to(to).subject(&email.subject);

        let message = match &email.body_html {
            Some(html) => builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_PLAIN)
                                .body(email.body_text.clone()),
                        )
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_HTML)
                                .body(html.clone()),
                        ),
                )
                .wrap_err("Failed to build multipart message")?,
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.body_text.clone())
                .wrap_err("Failed to build text message")?,
        };

        Ok(message)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &EmailMessage) -> Result<SendOutcome> {
        let message = self.build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .wrap_err("Failed to send email via SMTP")?;

        let message_id = response
            .message()
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| email.id.clone());

        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully"
        );

        Ok(SendOutcome { message_id })
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
