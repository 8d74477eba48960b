//! Outbound messaging: the producer abstraction and message envelope.

pub mod in_memory_producer;
pub mod message;
pub mod producer;

pub use in_memory_producer::InMemoryProducer;
pub use message::OutboundMessage;
pub use producer::{MessageProducer, ProducerError};
