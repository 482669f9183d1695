//! Configuration for the Accounts API

use core_config::auth::AuthConfig;
use core_config::mail::{MailConfig, SmtpConfig};
use core_config::server::ServerConfig;
use core_config::{env_required, FromEnv};

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub smtp: SmtpConfig,
    pub mail: MailConfig,
    pub database_url: String,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let auth = AuthConfig::from_env()?;
        let smtp = SmtpConfig::from_env()?;
        let mail = MailConfig::from_env()?;
        let database_url = env_required("DATABASE_URL")?;

        Ok(Self {
            server,
            auth,
            smtp,
            mail,
            database_url,
            environment,
        })
    }
}
