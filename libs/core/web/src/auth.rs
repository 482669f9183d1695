//! Bearer-token authentication helpers used inside handlers.

use crate::errors::ApiError;
use crate::jwt::{JwtAuth, JwtClaims};
use axum::http::HeaderMap;

/// Extract the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.to_string()))
}

/// Resolve and verify the caller's access token.
///
/// Missing, malformed, expired or wrong-kind tokens all surface as the
/// normalized 401.
pub fn authenticate(auth: &JwtAuth, headers: &HeaderMap) -> Result<JwtClaims, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided."))?;

    auth.verify_access(&token).map_err(|e| {
        tracing::debug!(error = %e, "access token rejected");
        ApiError::unauthorized("Given token not valid for any token type.")
    })
}

/// Require the authenticated caller to have staff privileges.
pub fn require_staff(claims: &JwtClaims) -> Result<(), ApiError> {
    if claims.is_staff {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied)
    }
}
