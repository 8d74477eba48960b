//! Transaction processing (application-level orchestration).
//!
//! `TransactionUseCase` composes a [`TransactionRepository`] and a
//! [`MessageProducer`]:
//!
//! ```text
//! NewTransaction
//!   ↓
//! 1. Accept (payload must be a JSON object; id + receive time assigned)
//!   ↓
//! 2. Persist through the repository
//!   ↓
//! 3. Publish the stored record to the transactions topic
//! ```
//!
//! Records are persisted before they are published: if persistence fails
//! nothing is published. If publication fails after a successful save, the
//! error is returned and the record stays stored (at-least-once on retry).
//!
//! This module contains no IO itself; it composes infrastructure traits.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument, warn};

use codebank_core::{DomainError, NewTransaction, Transaction, TransactionId};
use codebank_events::{MessageProducer, OutboundMessage, ProducerError};

use crate::repository::{RepositoryError, TransactionRepository};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The submission was rejected before anything was stored.
    #[error("validation failed: {0}")]
    Validation(String),
    /// No transaction with the requested id.
    #[error("transaction not found")]
    NotFound,
    /// Persisting or loading failed.
    #[error(transparent)]
    Store(#[from] RepositoryError),
    /// Publication failed after a successful save.
    #[error("transaction {id} stored but not published: {source}")]
    Publish {
        id: TransactionId,
        #[source]
        source: ProducerError,
    },
}

impl From<DomainError> for ProcessError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ProcessError::Validation(msg),
            DomainError::NotFound => ProcessError::NotFound,
        }
    }
}

/// The transaction use-case.
///
/// Every dependency is injected through [`TransactionUseCase::new`]; there is
/// no way to observe a partially wired instance.
pub struct TransactionUseCase {
    repository: Arc<dyn TransactionRepository>,
    producer: Arc<dyn MessageProducer>,
    topic: String,
}

impl std::fmt::Debug for TransactionUseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionUseCase")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

impl TransactionUseCase {
    pub fn new(
        repository: Arc<dyn TransactionRepository>,
        producer: Arc<dyn MessageProducer>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            producer,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Accept, persist and publish a transaction.
    #[instrument(skip(self, request), fields(topic = %self.topic), err)]
    pub async fn process(&self, request: NewTransaction) -> Result<Transaction, ProcessError> {
        let transaction = request.accept(TransactionId::new(), Utc::now())?;

        self.repository.save(&transaction).await?;

        let payload = serde_json::to_value(&transaction).map_err(|e| ProcessError::Publish {
            id: transaction.id,
            source: ProducerError::Serialization(e.to_string()),
        })?;
        let message = OutboundMessage::new(self.topic.clone(), transaction.id.to_string(), payload);

        self.producer
            .publish(message)
            .await
            .map_err(|source| ProcessError::Publish {
                id: transaction.id,
                source,
            })?;

        info!(transaction_id = %transaction.id, "transaction processed");
        Ok(transaction)
    }

    /// Load a previously processed transaction.
    pub async fn find(&self, id: TransactionId) -> Result<Transaction, ProcessError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ProcessError::NotFound)
    }

    /// Whether the backing store answers.
    pub async fn ready(&self) -> Result<(), ProcessError> {
        self.repository.ping().await.map_err(ProcessError::from)
    }

    /// Drain the producer queue; used on shutdown.
    pub async fn flush(&self, timeout: Duration) -> Result<(), ProducerError> {
        let result = self.producer.flush(timeout).await;
        if let Err(e) = &result {
            warn!(error = %e, "producer flush failed");
        }
        result
    }
}
