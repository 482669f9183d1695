use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User entity - matches the SQL schema
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    /// Unique, compared case-insensitively
    pub email: String,
    pub full_name: String,
    /// Argon2 hash, never exposed in API responses
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// A regular account: active, no staff or superuser privileges.
    pub fn new(email: String, full_name: String, password_hash: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            email,
            full_name,
            password_hash,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now(),
        }
    }
}

/// Lower-case the domain part of an email address.
///
/// The local part is kept as-is (it is case-sensitive per RFC), but
/// uniqueness is still enforced case-insensitively at the store level.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Public user fields (never includes password material)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub date_joined: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            date_joined: user.date_joined,
        }
    }
}

/// DTO for user signup
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 255, message = "Email must be at most 255 characters.")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Full name must be at most 150 characters."))]
    pub full_name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match."))]
    pub confirm_password: String,
}

/// DTO for login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Tokens plus the authenticated user's public profile
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// A fresh access token and the rotated refresh token
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordResetConfirm {
    pub uidb64: String,
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub new_password: String,
}

/// Generic success payload with a human-readable message
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// The uniform reply to every password-reset request, whether or not
/// the email matches an account (anti-enumeration).
pub const RESET_REQUESTED_MESSAGE: &str = "If the email exists, a reset link has been sent.";

/// Address entity - belongs to exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone_number: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

impl Address {
    /// Fields that define address identity for duplicate detection
    /// (everything except id and is_default).
    pub fn dedup_key(&self) -> (Uuid, &str, &str, &str, Option<&str>, &str, &str, &str) {
        (
            self.user_id,
            &self.full_name,
            &self.phone_number,
            &self.line1,
            self.line2.as_deref(),
            &self.city,
            &self.postal_code,
            &self.country,
        )
    }
}

/// DTO for creating or fully replacing an address
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddressInput {
    #[validate(length(min = 1, max = 150, message = "Recipient name is required."))]
    pub full_name: String,
    #[validate(length(min = 1, max = 32, message = "Phone number is required."))]
    pub phone_number: String,
    #[validate(length(min = 1, max = 255, message = "Address line is required."))]
    pub line1: String,
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100, message = "City is required."))]
    pub city: String,
    #[validate(length(min = 1, max = 20, message = "Postal code is required."))]
    pub postal_code: String,
    #[validate(length(min = 1, max = 100, message = "Country is required."))]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressInput {
    pub fn into_address(self, user_id: Uuid) -> Address {
        Address {
            id: Uuid::now_v7(),
            user_id,
            full_name: self.full_name,
            phone_number: self.phone_number,
            line1: self.line1,
            line2: self.line2,
            city: self.city,
            postal_code: self.postal_code,
            country: self.country,
            is_default: self.is_default,
        }
    }
}
