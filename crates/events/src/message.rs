use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Envelope for a message headed to a broker topic.
///
/// Notes:
/// - `key` drives partitioning on brokers that support it; use a stable id.
/// - `payload` is transport-agnostic JSON, encoded to bytes only at the edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    topic: String,
    key: String,
    payload: JsonValue,
}

impl OutboundMessage {
    pub fn new(topic: impl Into<String>, key: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            topic: topic.into(),
            key: key.into(),
            payload,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    /// Encode the payload as UTF-8 JSON bytes.
    pub fn payload_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.payload)
    }
}
