use crate::{env_or_default, env_parse_or, env_required, ConfigError, FromEnv};

/// SMTP transport configuration
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub use_tls: bool,
}

impl FromEnv for SmtpConfig {
    /// Reads SMTP_HOST (required), SMTP_PORT (default 587),
    /// SMTP_USERNAME/SMTP_PASSWORD (optional, empty means no auth —
    /// the Mailpit/Mailhog case) and SMTP_USE_TLS (default true).
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_required("SMTP_HOST")?,
            port: env_parse_or("SMTP_PORT", 587)?,
            username: env_or_default("SMTP_USERNAME", ""),
            password: env_or_default("SMTP_PASSWORD", ""),
            use_tls: env_or_default("SMTP_USE_TLS", "true") == "true",
        })
    }
}

/// Outbound mail settings shared by all message builders
#[derive(Clone, Debug)]
pub struct MailConfig {
    pub from_email: String,
    pub from_name: String,
    /// Base URL of the frontend application, used to build links
    /// embedded in emails (e.g. password reset).
    pub frontend_url: String,
}

impl FromEnv for MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            from_email: env_required("EMAIL_FROM_ADDRESS")?,
            from_name: env_or_default("EMAIL_FROM_NAME", "Accounts"),
            frontend_url: env_or_default("FRONTEND_URL", "http://localhost:3000"),
        })
    }
}
