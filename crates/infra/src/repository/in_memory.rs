use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use codebank_core::{Transaction, TransactionId};

use super::r#trait::{RepositoryError, TransactionRepository};

/// In-memory transaction repository.
///
/// Intended for tests/dev. Can be switched offline to exercise storage failures.
#[derive(Debug, Default)]
pub struct InMemoryTransactionRepository {
    records: RwLock<HashMap<TransactionId, Transaction>>,
    offline: AtomicBool,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `Unavailable` (or recover).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_online(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("in-memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn save(&self, transaction: &Transaction) -> Result<(), RepositoryError> {
        self.ensure_online()?;

        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))?;

        if records.contains_key(&transaction.id) {
            return Err(RepositoryError::Duplicate(transaction.id.to_string()));
        }
        records.insert(transaction.id, transaction.clone());

        Ok(())
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, RepositoryError> {
        self.ensure_online()?;

        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::Storage("lock poisoned".to_string()))?;

        Ok(records.get(&id).cloned())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.ensure_online()
    }
}
