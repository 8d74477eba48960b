//! Infrastructure message producers.
//!
//! The producer abstraction lives in `codebank-events` as pure mechanics.
//! This module provides broker-backed implementations (e.g. Kafka).

#[cfg(feature = "kafka")]
pub mod kafka;

#[cfg(feature = "kafka")]
pub use kafka::KafkaProducer;
