//! Accounts Domain
//!
//! User registration, JWT login/refresh, profiles, an admin user
//! listing, the email-based password-reset flow and per-user shipping
//! addresses.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (axum router)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business rules, password hashing, reset tokens
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │   Stores    │  ← UserStore / AddressStore traits + impls
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │   Models    │  ← Entities and DTOs
//! └─────────────┘
//! ```
//!
//! Each store method documents the constraint-violation error it can
//! raise, so the backing technology (Postgres in production, in-memory
//! for tests and development) is swappable without touching handlers.

pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod reset;
pub mod service;

pub use error::AccountsError;
pub use handlers::{router, AccountsState, ApiDoc, VIEWS};
pub use models::{Address, User, UserResponse};
pub use postgres::{PostgresAddressStore, PostgresUserStore};
pub use repository::{AddressStore, InMemoryAddressStore, InMemoryUserStore, UserStore};
pub use service::AccountsService;
