use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use core_config::auth::AuthConfig;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::User;

const RESET_PURPOSE: &str = "password_reset";

/// Claims carried by a password-reset token. `pfp` fingerprints the
/// password hash at issuance time, so a successful reset invalidates
/// every token issued before it without any server-side state.
#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: String,
    pfp: String,
    purpose: String,
    exp: i64,
    iat: i64,
}

/// Stateless single-use password reset tokens.
#[derive(Clone)]
pub struct ResetTokens {
    secret: String,
    ttl_secs: i64,
}

impl ResetTokens {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            ttl_secs: config.reset_ttl_secs,
        }
    }

    /// Issue a reset token bound to the user's current password hash.
    pub fn generate(&self, user: &User) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = ResetClaims {
            sub: user.id.to_string(),
            pfp: password_fingerprint(&user.password_hash),
            purpose: RESET_PURPOSE.to_string(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Check a token against the user it claims to be for. Returns
    /// false for expired, tampered, or already-consumed tokens.
    pub fn verify(&self, token: &str, user: &User) -> bool {
        let decoded = decode::<ResetClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        );

        let claims = match decoded {
            Ok(data) => data.claims,
            Err(_) => return false,
        };

        claims.purpose == RESET_PURPOSE
            && claims.sub == user.id.to_string()
            && claims.pfp == password_fingerprint(&user.password_hash)
    }
}

fn password_fingerprint(password_hash: &str) -> String {
    let digest = Sha256::digest(password_hash.as_bytes());
    // 16 bytes of the digest is plenty to detect a changed hash
    hex_prefix(&digest, 16)
}

fn hex_prefix(bytes: &[u8], len: usize) -> String {
    bytes
        .iter()
        .take(len)
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Encode a user id for the reset link path segment.
pub fn encode_uid(id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

/// Decode the reset link path segment back into a user id.
pub fn decode_uid(uidb64: &str) -> Option<Uuid> {
    let bytes = URL_SAFE_NO_PAD.decode(uidb64).ok()?;
    let raw = String::from_utf8(bytes).ok()?;
    Uuid::parse_str(&raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> ResetTokens {
        ResetTokens {
            secret: "test-secret".to_string(),
            ttl_secs: 3_600,
        }
    }

    fn user() -> User {
        User::new(
            "reset@example.com".to_string(),
            "Reset User".to_string(),
            "$argon2id$fake-hash".to_string(),
        )
    }

    #[test]
    fn token_roundtrip() {
        let tokens = tokens();
        let user = user();

        let token = tokens.generate(&user).unwrap();
        assert!(tokens.verify(&token, &user));
    }

    #[test]
    fn token_is_bound_to_the_user() {
        let tokens = tokens();
        let user = user();
        let other = User::new(
            "other@example.com".to_string(),
            "Other".to_string(),
            "$argon2id$fake-hash".to_string(),
        );

        let token = tokens.generate(&user).unwrap();
        assert!(!tokens.verify(&token, &other));
    }

    #[test]
    fn token_invalidated_by_password_change() {
        let tokens = tokens();
        let mut user = user();

        let token = tokens.generate(&user).unwrap();
        user.password_hash = "$argon2id$new-hash".to_string();

        assert!(!tokens.verify(&token, &user));
    }

    #[test]
    fn expired_token_rejected() {
        let tokens = ResetTokens {
            secret: "test-secret".to_string(),
            ttl_secs: -120,
        };
        let user = user();

        let token = tokens.generate(&user).unwrap();
        assert!(!tokens.verify(&token, &user));
    }

    #[test]
    fn tampered_token_rejected() {
        let tokens = tokens();
        let user = user();

        let token = tokens.generate(&user).unwrap();
        let other = ResetTokens {
            secret: "different-secret".to_string(),
            ttl_secs: 3_600,
        };
        assert!(!other.verify(&token, &user));
    }

    #[test]
    fn uid_roundtrip() {
        let id = Uuid::now_v7();
        let encoded = encode_uid(id);
        assert_eq!(decode_uid(&encoded), Some(id));
    }

    #[test]
    fn malformed_uid_rejected() {
        assert_eq!(decode_uid("!!not-base64!!"), None);
        assert_eq!(decode_uid(&URL_SAFE_NO_PAD.encode("not-a-uuid")), None);
    }
}
