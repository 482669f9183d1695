use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use mailer::MailerService;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AccountsError, AccountsResult};
use crate::models::{normalize_email, Address, AddressInput, RegisterRequest, User};
use crate::repository::{AddressStore, UserStore};
use crate::reset::{self, ResetTokens};

/// Service layer for account business logic
pub struct AccountsService<U: UserStore, A: AddressStore> {
    users: Arc<U>,
    addresses: Arc<A>,
    reset: ResetTokens,
    mailer: MailerService,
}

// Manual impl so U and A are not required to be Clone themselves.
impl<U: UserStore, A: AddressStore> Clone for AccountsService<U, A> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            addresses: Arc::clone(&self.addresses),
            reset: self.reset.clone(),
            mailer: self.mailer.clone(),
        }
    }
}

impl<U: UserStore, A: AddressStore> AccountsService<U, A> {
    pub fn new(users: U, addresses: A, reset: ResetTokens, mailer: MailerService) -> Self {
        Self {
            users: Arc::new(users),
            addresses: Arc::new(addresses),
            reset,
            mailer,
        }
    }

    /// Register a new account. Input is assumed to have passed request
    /// validation already (password length, confirmation match).
    pub async fn register(&self, input: RegisterRequest) -> AccountsResult<User> {
        let email = normalize_email(input.email.trim());
        if email.is_empty() {
            return Err(AccountsError::EmptyEmail);
        }

        let password_hash = self.hash_password(&input.password)?;
        let user = User::new(email, input.full_name, password_hash);

        self.users.create(user).await
    }

    /// Check email + password against the store.
    ///
    /// Unknown email, wrong password, and deactivated accounts all
    /// collapse into `InvalidCredentials` so the response does not
    /// leak which of them it was.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> AccountsResult<User> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AccountsError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AccountsError::InvalidCredentials);
        }

        if !self.verify_password(password, &user.password_hash)? {
            return Err(AccountsError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> AccountsResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AccountsError::NotFound)
    }

    pub async fn list_users(&self) -> AccountsResult<Vec<User>> {
        self.users.list().await
    }

    /// Start the password-reset flow for an email address.
    ///
    /// Always succeeds from the caller's perspective: unknown emails,
    /// inactive accounts, and mailer failures are absorbed here so the
    /// endpoint can return the same response either way.
    pub async fn request_password_reset(&self, email: &str) -> AccountsResult<()> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) if user.is_active => user,
            _ => {
                tracing::debug!("Password reset requested for unknown or inactive account");
                return Ok(());
            }
        };

        let token = self
            .reset
            .generate(&user)
            .map_err(|e| AccountsError::Storage(format!("Failed to issue reset token: {}", e)))?;
        let uidb64 = reset::encode_uid(user.id);

        if let Err(e) = self
            .mailer
            .send_password_reset(&user.email, &user.full_name, &uidb64, &token)
            .await
        {
            // The uniform response must hold even when delivery fails
            tracing::error!(user_id = %user.id, error = %e, "Failed to send password reset email");
        }

        Ok(())
    }

    /// Complete the password-reset flow with a token from the email link.
    pub async fn confirm_password_reset(
        &self,
        uidb64: &str,
        token: &str,
        new_password: &str,
    ) -> AccountsResult<()> {
        let user_id = reset::decode_uid(uidb64).ok_or(AccountsError::InvalidResetLink)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AccountsError::InvalidResetLink)?;

        if !self.reset.verify(token, &user) {
            return Err(AccountsError::InvalidResetToken);
        }

        let password_hash = self.hash_password(new_password)?;
        self.users.update_password(user.id, &password_hash).await?;

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }

    pub async fn list_addresses(&self, user_id: Uuid) -> AccountsResult<Vec<Address>> {
        self.addresses.list_for_user(user_id).await
    }

    pub async fn create_address(
        &self,
        user_id: Uuid,
        input: AddressInput,
    ) -> AccountsResult<Address> {
        self.addresses.create(input.into_address(user_id)).await
    }

    /// Fully replace an existing address owned by the user.
    pub async fn update_address(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        input: AddressInput,
    ) -> AccountsResult<Address> {
        let mut address = input.into_address(user_id);
        address.id = address_id;
        self.addresses.update(address).await
    }

    pub async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> AccountsResult<()> {
        if !self.addresses.delete(user_id, address_id).await? {
            return Err(AccountsError::NotFound);
        }
        Ok(())
    }

    fn hash_password(&self, password: &str) -> AccountsResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AccountsError::PasswordHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AccountsResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AccountsError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
