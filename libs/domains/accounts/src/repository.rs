use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AccountsError, AccountsResult};
use crate::models::{Address, User};

/// Persistence behind user operations.
///
/// Uniqueness is the store's responsibility: callers must be able to
/// rely on the documented constraint errors instead of re-checking.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user.
    ///
    /// Errors: [`AccountsError::EmptyEmail`] for a blank email,
    /// [`AccountsError::DuplicateEmail`] when the email is already
    /// taken (compared case-insensitively).
    async fn create(&self, user: User) -> AccountsResult<User>;

    async fn find_by_id(&self, id: Uuid) -> AccountsResult<Option<User>>;

    /// Case-insensitive lookup by email.
    async fn find_by_email(&self, email: &str) -> AccountsResult<Option<User>>;

    /// All users, oldest first.
    async fn list(&self) -> AccountsResult<Vec<User>>;

    /// Replace the stored password hash.
    ///
    /// Errors: [`AccountsError::NotFound`] for an unknown id.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> AccountsResult<()>;
}

/// Persistence behind address operations. All lookups are scoped to
/// the owning user; another user's address id behaves as missing.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Persist a new address.
    ///
    /// Errors: [`AccountsError::DuplicateAddress`] when an identical
    /// address already exists for the user,
    /// [`AccountsError::DefaultAddressExists`] when `is_default` is set
    /// and the user already has a default address.
    async fn create(&self, address: Address) -> AccountsResult<Address>;

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> AccountsResult<Option<Address>>;

    async fn list_for_user(&self, user_id: Uuid) -> AccountsResult<Vec<Address>>;

    /// Replace an existing address (same constraint errors as `create`,
    /// plus [`AccountsError::NotFound`] for an unknown id).
    async fn update(&self, address: Address) -> AccountsResult<Address>;

    /// Returns whether an address was deleted.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> AccountsResult<bool>;
}

/// In-memory implementation of UserStore (development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: User) -> AccountsResult<User> {
        if user.email.trim().is_empty() {
            return Err(AccountsError::EmptyEmail);
        }

        let mut users = self.users.write().await;

        let email_taken = users
            .values()
            .any(|u| u.email.to_lowercase() == user.email.to_lowercase());
        if email_taken {
            return Err(AccountsError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AccountsResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AccountsResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.to_lowercase() == email.to_lowercase())
            .cloned())
    }

    async fn list(&self) -> AccountsResult<Vec<User>> {
        let users = self.users.read().await;
        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| a.date_joined.cmp(&b.date_joined));
        Ok(result)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AccountsResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(AccountsError::NotFound)?;
        user.password_hash = password_hash.to_string();

        tracing::info!(user_id = %id, "Updated user password");
        Ok(())
    }
}

/// In-memory implementation of AddressStore (development/testing).
///
/// Constraint checks run under the write lock, so the single-default
/// invariant cannot be violated by concurrent writers on this backend.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAddressStore {
    addresses: Arc<RwLock<HashMap<Uuid, Address>>>,
}

impl InMemoryAddressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AddressStore for InMemoryAddressStore {
    async fn create(&self, address: Address) -> AccountsResult<Address> {
        let mut addresses = self.addresses.write().await;

        let duplicate = addresses
            .values()
            .any(|a| a.dedup_key() == address.dedup_key());
        if duplicate {
            return Err(AccountsError::DuplicateAddress);
        }

        if address.is_default {
            let has_default = addresses
                .values()
                .any(|a| a.user_id == address.user_id && a.is_default);
            if has_default {
                return Err(AccountsError::DefaultAddressExists);
            }
        }

        addresses.insert(address.id, address.clone());

        tracing::info!(address_id = %address.id, user_id = %address.user_id, "Created address");
        Ok(address)
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> AccountsResult<Option<Address>> {
        let addresses = self.addresses.read().await;
        Ok(addresses
            .get(&id)
            .filter(|a| a.user_id == user_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AccountsResult<Vec<Address>> {
        let addresses = self.addresses.read().await;
        let mut result: Vec<Address> = addresses
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|a| a.id);
        Ok(result)
    }

    async fn update(&self, address: Address) -> AccountsResult<Address> {
        let mut addresses = self.addresses.write().await;

        let exists = addresses
            .get(&address.id)
            .is_some_and(|a| a.user_id == address.user_id);
        if !exists {
            return Err(AccountsError::NotFound);
        }

        let duplicate = addresses
            .values()
            .any(|a| a.id != address.id && a.dedup_key() == address.dedup_key());
        if duplicate {
            return Err(AccountsError::DuplicateAddress);
        }

        if address.is_default {
            let other_default = addresses
                .values()
                .any(|a| a.id != address.id && a.user_id == address.user_id && a.is_default);
            if other_default {
                return Err(AccountsError::DefaultAddressExists);
            }
        }

        addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AccountsResult<bool> {
        let mut addresses = self.addresses.write().await;

        let owned = addresses.get(&id).is_some_and(|a| a.user_id == user_id);
        if !owned {
            return Ok(false);
        }

        addresses.remove(&id);
        Ok(true)
    }
}
