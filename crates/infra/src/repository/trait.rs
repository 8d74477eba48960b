use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use codebank_core::{Transaction, TransactionId};

/// Repository operation error.
///
/// These are **infrastructure errors** (storage, connectivity) as opposed to
/// domain errors (validation).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A transaction with the same id is already stored.
    #[error("duplicate transaction: {0}")]
    Duplicate(String),

    /// The backing store could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be mapped back to a transaction.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Any other storage failure.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Persistence port for processed transactions.
///
/// Records are immutable once saved: there is no update or delete.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persist a new transaction. Saving an existing id is `Duplicate`.
    async fn save(&self, transaction: &Transaction) -> Result<(), RepositoryError>;

    /// Load a transaction by id. `Ok(None)` when it does not exist.
    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, RepositoryError>;

    /// Round-trip to the backing store.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<R> TransactionRepository for Arc<R>
where
    R: TransactionRepository + ?Sized,
{
    async fn save(&self, transaction: &Transaction) -> Result<(), RepositoryError> {
        (**self).save(transaction).await
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        (**self).ping().await
    }
}
