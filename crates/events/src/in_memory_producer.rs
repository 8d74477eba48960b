//! In-memory producer for tests/dev.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::message::OutboundMessage;
use crate::producer::{MessageProducer, ProducerError};

/// In-memory producer.
///
/// - No IO
/// - Keeps every published message in order
/// - Can be switched into a failing mode to exercise error paths
#[derive(Debug, Default)]
pub struct InMemoryProducer {
    published: Mutex<Vec<OutboundMessage>>,
    failing: AtomicBool,
    flushes: AtomicUsize,
}

impl InMemoryProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `publish` and `flush` calls fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of all messages published so far.
    pub fn published(&self) -> Vec<OutboundMessage> {
        self.published
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageProducer for InMemoryProducer {
    async fn publish(&self, message: OutboundMessage) -> Result<(), ProducerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProducerError::Delivery(format!(
                "in-memory producer rejected message for topic '{}'",
                message.topic()
            )));
        }

        let mut published = self
            .published
            .lock()
            .map_err(|_| ProducerError::Delivery("lock poisoned".to_string()))?;
        published.push(message);

        Ok(())
    }

    async fn flush(&self, _timeout: Duration) -> Result<(), ProducerError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProducerError::Flush("in-memory producer is failing".to_string()));
        }
        Ok(())
    }
}
