//! Infrastructure layer: configuration, Postgres, Kafka and the transaction use-case.

pub mod config;
pub mod db;
pub mod producer;
pub mod repository;
pub mod use_case;

pub use config::{AppConfig, ConfigError, DatabaseSettings, KafkaSettings, ServerSettings};
pub use db::{DatabaseError, close_pool, open_pool};
pub use repository::{
    InMemoryTransactionRepository, PostgresTransactionRepository, RepositoryError,
    TransactionRepository,
};
pub use use_case::{ProcessError, TransactionUseCase};
