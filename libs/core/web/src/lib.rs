//! HTTP plumbing shared by all request handlers.
//!
//! - [`errors`]: the error normalizer — every failure path is translated
//!   into one uniform JSON envelope
//! - [`extract`]: request extractors (validated JSON bodies)
//! - [`jwt`]: access/refresh token issuance and verification
//! - [`auth`]: bearer-token authentication helpers for handlers

pub mod auth;
pub mod errors;
pub mod extract;
pub mod jwt;

pub use auth::{authenticate, bearer_token, require_staff};
pub use errors::{fallback_not_found, normalize_errors, ApiError, ErrorEnvelope, NormalizeConfig};
pub use extract::ValidatedJson;
pub use jwt::{JwtAuth, JwtClaims, TokenKind, TokenPair};
