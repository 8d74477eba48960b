//! `codebank-core` — domain building blocks for the transaction service.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod transaction;

pub use error::{DomainError, DomainResult};
pub use id::TransactionId;
pub use transaction::{NewTransaction, Transaction};
