//! Outbound email.
//!
//! A small provider abstraction (SMTP via lettre, plus an in-memory
//! mock for tests) and the message builders the accounts domain needs.
//! Dispatch is synchronous within the request; there is no queue here.

pub mod message;
pub mod provider;
pub mod service;

pub use message::EmailMessage;
pub use provider::{EmailProvider, MockProvider, SendOutcome, SmtpProvider};
pub use service::MailerService;
