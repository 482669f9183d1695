use crate::{env_parse_or, env_required, ConfigError, FromEnv};

/// Default access token lifetime (15 minutes)
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 900;
/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 604_800;
/// Default password reset token lifetime (1 hour)
pub const DEFAULT_RESET_TTL_SECS: i64 = 3_600;

/// JWT signing configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 signing secret. Required, no default.
    pub jwt_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    /// Lifetime of password reset tokens
    pub reset_ttl_secs: i64,
}

impl FromEnv for AuthConfig {
    /// Reads JWT_SECRET (required) plus optional TTL overrides
    /// ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS and
    /// PASSWORD_RESET_TTL_SECS.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            jwt_secret: env_required("JWT_SECRET")?,
            access_ttl_secs: env_parse_or("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TTL_SECS)?,
            refresh_ttl_secs: env_parse_or("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TTL_SECS)?,
            reset_ttl_secs: env_parse_or("PASSWORD_RESET_TTL_SECS", DEFAULT_RESET_TTL_SECS)?,
        })
    }
}
