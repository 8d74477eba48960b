//! Transaction persistence.
//!
//! The repository abstraction lives in `trait.rs`; `postgres` is the
//! production backend and `in_memory` serves tests/dev.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryTransactionRepository;
pub use postgres::PostgresTransactionRepository;
pub use r#trait::{RepositoryError, TransactionRepository};
