//! Kafka-backed message producer.
//!
//! Wraps an rdkafka `FutureProducer`. Creating the client does not contact the
//! brokers; connections are established in the background and failures show
//! up as delivery errors on `publish`.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use tracing::{info, instrument};

use codebank_events::{MessageProducer, OutboundMessage, ProducerError};

use crate::config::KafkaSettings;

/// How long librdkafka may retry a message before reporting it failed.
const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long `publish` waits for room in the local queue.
const DEFAULT_QUEUE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct KafkaProducer {
    inner: FutureProducer,
    queue_timeout: Duration,
}

impl std::fmt::Debug for KafkaProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaProducer")
            .field("queue_timeout", &self.queue_timeout)
            .finish_non_exhaustive()
    }
}

impl KafkaProducer {
    /// Create a producer bound to the configured bootstrap servers.
    pub fn setup(settings: &KafkaSettings) -> Result<Self, ProducerError> {
        let servers = settings.bootstrap_servers.trim();
        if servers.is_empty() {
            return Err(ProducerError::Setup(
                "no bootstrap servers configured".to_string(),
            ));
        }

        let inner: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", servers)
            .set(
                "message.timeout.ms",
                DEFAULT_MESSAGE_TIMEOUT.as_millis().to_string(),
            )
            .create()
            .map_err(|e| ProducerError::Setup(e.to_string()))?;

        info!(bootstrap_servers = %servers, "kafka producer created");

        Ok(Self {
            inner,
            queue_timeout: DEFAULT_QUEUE_TIMEOUT,
        })
    }
}

#[async_trait]
impl MessageProducer for KafkaProducer {
    #[instrument(skip(self, message), fields(topic = %message.topic(), key = %message.key()), err)]
    async fn publish(&self, message: OutboundMessage) -> Result<(), ProducerError> {
        let payload = message
            .payload_bytes()
            .map_err(|e| ProducerError::Serialization(e.to_string()))?;

        let record = FutureRecord::to(message.topic())
            .key(message.key())
            .payload(&payload);

        self.inner
            .send(record, self.queue_timeout)
            .await
            .map(|_| ())
            .map_err(|(e, _)| ProducerError::Delivery(e.to_string()))
    }

    async fn flush(&self, timeout: Duration) -> Result<(), ProducerError> {
        let inner = self.inner.clone();

        // librdkafka's flush blocks the calling thread.
        tokio::task::spawn_blocking(move || inner.flush(timeout))
            .await
            .map_err(|e| ProducerError::Flush(e.to_string()))?
            .map_err(|e| ProducerError::Flush(e.to_string()))
    }
}
