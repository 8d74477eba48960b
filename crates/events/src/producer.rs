//! Message producer abstraction (mechanics only).
//!
//! A producer hands messages to a broker. Implementations decide the
//! transport (Kafka, in-memory, ...); callers only see `publish` and `flush`.
//!
//! Delivery is **at-least-once** from the caller's point of view: a failed
//! `publish` may be retried, and a retry may duplicate a message that the
//! broker had in fact accepted. Consumers must be idempotent on the key.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::message::OutboundMessage;

/// Producer operation error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProducerError {
    /// The producer could not be created (bad configuration, client init failure).
    #[error("producer setup failed: {0}")]
    Setup(String),

    /// The message could not be encoded.
    #[error("message serialization failed: {0}")]
    Serialization(String),

    /// The broker did not acknowledge the message.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Queued messages could not be flushed before the timeout.
    #[error("flush failed: {0}")]
    Flush(String),
}

/// Domain-agnostic message producer.
///
/// The trait requires `Send + Sync`: one producer is shared by every request
/// handler for the lifetime of the process.
#[async_trait]
pub trait MessageProducer: Send + Sync {
    /// Publish a single message and wait for the broker acknowledgement.
    async fn publish(&self, message: OutboundMessage) -> Result<(), ProducerError>;

    /// Wait (up to `timeout`) for all queued messages to be delivered.
    async fn flush(&self, timeout: Duration) -> Result<(), ProducerError>;
}

#[async_trait]
impl<P> MessageProducer for Arc<P>
where
    P: MessageProducer + ?Sized,
{
    async fn publish(&self, message: OutboundMessage) -> Result<(), ProducerError> {
        (**self).publish(message).await
    }

    async fn flush(&self, timeout: Duration) -> Result<(), ProducerError> {
        (**self).flush(timeout).await
    }
}
