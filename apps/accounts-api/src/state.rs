//! Application state management

use domain_accounts::{AccountsState, PostgresAddressStore, PostgresUserStore};

/// Shared application state for the production wiring
pub type AppState = AccountsState<PostgresUserStore, PostgresAddressStore>;
