use chrono::{Duration, Utc};
use core_config::auth::AuthConfig;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distinguishes the two token flavors; a refresh token can never be
/// used to authenticate a request and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub kind: TokenKind,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl JwtClaims {
    pub fn user_id(&self) -> eyre::Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| eyre::eyre!("malformed subject claim: {e}"))
    }
}

/// An issued access/refresh token pair.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Stateless HS256 token issuance and verification.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl JwtAuth {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        }
    }

    /// Issue an access + refresh pair for an authenticated user.
    pub fn issue_pair(
        &self,
        user_id: Uuid,
        email: &str,
        is_staff: bool,
        is_superuser: bool,
    ) -> eyre::Result<TokenPair> {
        Ok(TokenPair {
            access: self.create_token(
                user_id,
                email,
                is_staff,
                is_superuser,
                TokenKind::Access,
                self.access_ttl_secs,
            )?,
            refresh: self.create_token(
                user_id,
                email,
                is_staff,
                is_superuser,
                TokenKind::Refresh,
                self.refresh_ttl_secs,
            )?,
        })
    }

    /// Issue a fresh access token from verified refresh claims.
    pub fn reissue_access(&self, claims: &JwtClaims) -> eyre::Result<String> {
        self.create_token(
            claims.user_id()?,
            &claims.email,
            claims.is_staff,
            claims.is_superuser,
            TokenKind::Access,
            self.access_ttl_secs,
        )
    }

    fn create_token(
        &self,
        user_id: Uuid,
        email: &str,
        is_staff: bool,
        is_superuser: bool,
        kind: TokenKind,
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            is_staff,
            is_superuser,
            kind,
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
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

    /// Verify signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Verify a token and require it to be an access token.
    pub fn verify_access(&self, token: &str) -> eyre::Result<JwtClaims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Access {
            return Err(eyre::eyre!("token is not an access token"));
        }
        Ok(claims)
    }

    /// Verify a token and require it to be a refresh token.
    pub fn verify_refresh(&self, token: &str) -> eyre::Result<JwtClaims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(eyre::eyre!("token is not a refresh token"));
        }
        Ok(claims)
    }
}
