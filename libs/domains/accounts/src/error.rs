use thiserror::Error;
use web_core::ApiError;

/// Domain-level errors for account and address operations.
///
/// Everything here converts into the normalized [`ApiError`] taxonomy;
/// handlers never map these by hand.
#[derive(Debug, Error)]
pub enum AccountsError {
    #[error("account or address not found")]
    NotFound,

    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("identical address already exists for this user")]
    DuplicateAddress,

    #[error("user already has a default address")]
    DefaultAddressExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email must not be empty")]
    EmptyEmail,

    #[error("password reset link is invalid")]
    InvalidResetLink,

    #[error("password reset token is invalid or expired")]
    InvalidResetToken,

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type AccountsResult<T> = Result<T, AccountsError>;

impl From<AccountsError> for ApiError {
    fn from(error: AccountsError) -> Self {
        match error {
            AccountsError::NotFound => ApiError::NotFound,
            AccountsError::DuplicateEmail(_) => {
                ApiError::field("email", "A user with this email already exists.")
            }
            AccountsError::DuplicateAddress => {
                ApiError::flat(vec!["This address already exists for this user.".into()])
            }
            AccountsError::DefaultAddressExists => ApiError::field(
                "is_default",
                "A default address already exists for this user.",
            ),
            AccountsError::InvalidCredentials => {
                ApiError::unauthorized("No active account found with the given credentials.")
            }
            AccountsError::EmptyEmail => ApiError::field("email", "Email must not be empty."),
            AccountsError::InvalidResetLink => {
                ApiError::field("uidb64", "Invalid or corrupted link.")
            }
            AccountsError::InvalidResetToken => {
                ApiError::field("token", "Invalid or expired token.")
            }
            AccountsError::PasswordHash(detail) => {
                ApiError::Internal(eyre::eyre!("password hashing failed: {detail}"))
            }
            AccountsError::Storage(detail) => {
                ApiError::Internal(eyre::eyre!("storage error: {detail}"))
            }
        }
    }
}
