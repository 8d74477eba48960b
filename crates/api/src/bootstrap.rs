//! Composition root.
//!
//! Builds every process-wide dependency, leaves first, then serves:
//!
//! ```text
//! START → CONFIG_LOADED → DATABASE_OPEN → PRODUCER_READY → USE_CASE_BUILT → SERVING → STOPPED
//! ```
//!
//! Any failure before `SERVING` aborts the sequence; handles opened so far
//! are released before the error is returned. After the server stops, the
//! producer is flushed and only then is the database closed.
//!
//! Backends are reached through [`Infrastructure`] so the sequence itself can
//! be exercised without Postgres or Kafka.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info};

use codebank_events::{MessageProducer, ProducerError};
use codebank_infra::config::DEFAULT_ENV_FILE;
use codebank_infra::producer::KafkaProducer;
use codebank_infra::{
    AppConfig, ConfigError, DatabaseError, DatabaseSettings, KafkaSettings,
    PostgresTransactionRepository, TransactionRepository, TransactionUseCase, close_pool, open_pool,
};

use crate::server::{RpcServer, ServerError};

/// How long shutdown waits for queued messages to reach the broker.
const PRODUCER_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BootstrapStage {
    Start,
    ConfigLoaded,
    DatabaseOpen,
    ProducerReady,
    UseCaseBuilt,
    Serving,
    Stopped,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("error loading configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("error connecting to database: {0}")]
    Database(#[from] DatabaseError),

    #[error("error setting up message producer: {0}")]
    Producer(#[from] ProducerError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl BootstrapError {
    /// Last stage completed before the failure.
    pub fn stage(&self) -> BootstrapStage {
        match self {
            BootstrapError::Config(_) => BootstrapStage::Start,
            BootstrapError::Database(_) => BootstrapStage::ConfigLoaded,
            BootstrapError::Producer(_) => BootstrapStage::DatabaseOpen,
            BootstrapError::Server(ServerError::Bind { .. }) => BootstrapStage::UseCaseBuilt,
            BootstrapError::Server(ServerError::Serve(_)) => BootstrapStage::Serving,
        }
    }
}

/// Outcome of a clean run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Stages in the order they were reached.
    pub stages: Vec<BootstrapStage>,
    /// Address the server listened on.
    pub local_addr: Option<SocketAddr>,
}

/// Backends the composition root wires together.
#[async_trait]
pub trait Infrastructure: Send + Sync {
    type Database: Send + Sync + 'static;

    fn open_database(&self, settings: &DatabaseSettings) -> Result<Self::Database, DatabaseError>;

    fn setup_producer(&self, settings: &KafkaSettings) -> Result<Arc<dyn MessageProducer>, ProducerError>;

    fn transaction_repository(&self, database: &Self::Database) -> Arc<dyn TransactionRepository>;

    async fn close_database(&self, database: Self::Database);
}

/// Production backends: Postgres pool + Kafka producer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresKafka;

#[async_trait]
impl Infrastructure for PostgresKafka {
    type Database = PgPool;

    fn open_database(&self, settings: &DatabaseSettings) -> Result<PgPool, DatabaseError> {
        open_pool(settings)
    }

    fn setup_producer(&self, settings: &KafkaSettings) -> Result<Arc<dyn MessageProducer>, ProducerError> {
        let producer: Arc<dyn MessageProducer> = Arc::new(KafkaProducer::setup(settings)?);
        Ok(producer)
    }

    fn transaction_repository(&self, pool: &PgPool) -> Arc<dyn TransactionRepository> {
        Arc::new(PostgresTransactionRepository::new(pool.clone()))
    }

    async fn close_database(&self, pool: PgPool) {
        close_pool(&pool).await;
    }
}

/// The environment file the process loads: always `.env` in the working directory.
pub fn default_env_file() -> PathBuf {
    PathBuf::from(DEFAULT_ENV_FILE)
}

/// Wire the use-case: repository and producer are injected at construction.
pub fn setup_transaction_use_case(
    repository: Arc<dyn TransactionRepository>,
    producer: Arc<dyn MessageProducer>,
    topic: &str,
) -> Arc<TransactionUseCase> {
    Arc::new(TransactionUseCase::new(repository, producer, topic))
}

#[derive(Debug, Default)]
struct Progress {
    stages: Vec<BootstrapStage>,
}

impl Progress {
    fn reach(&mut self, stage: BootstrapStage) {
        info!(stage = ?stage, "bootstrap stage reached");
        self.stages.push(stage);
    }
}

/// Run the service: load `env_file`, wire everything, serve until `shutdown`.
pub async fn run<I, F>(
    env_file: &Path,
    infra: &I,
    shutdown: F,
) -> Result<BootstrapReport, BootstrapError>
where
    I: Infrastructure,
    F: Future<Output = ()> + Send + 'static,
{
    let mut progress = Progress::default();

    let config = AppConfig::load(env_file)?;
    progress.reach(BootstrapStage::ConfigLoaded);

    let database = infra.open_database(&config.database)?;
    progress.reach(BootstrapStage::DatabaseOpen);

    let producer = match infra.setup_producer(&config.kafka) {
        Ok(producer) => producer,
        Err(e) => {
            error!(error = %e, "producer setup failed; releasing database");
            infra.close_database(database).await;
            return Err(e.into());
        }
    };
    progress.reach(BootstrapStage::ProducerReady);

    let repository = infra.transaction_repository(&database);
    let use_case = setup_transaction_use_case(repository, producer, &config.kafka.transactions_topic);
    progress.reach(BootstrapStage::UseCaseBuilt);

    let server = RpcServer::new(use_case);
    let listener = match RpcServer::bind(&config.server.address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, "server bind failed; releasing resources");
            // Failures are logged by `flush`; the database is released regardless.
            server.use_case().flush(PRODUCER_FLUSH_TIMEOUT).await.ok();
            infra.close_database(database).await;
            return Err(e.into());
        }
    };
    let local_addr = listener.local_addr().ok();
    progress.reach(BootstrapStage::Serving);

    let served = server.serve(listener, shutdown).await;

    // Release in reverse order of acquisition. Flush failures are logged by
    // `flush` and must not keep the database open.
    server.use_case().flush(PRODUCER_FLUSH_TIMEOUT).await.ok();
    infra.close_database(database).await;
    progress.reach(BootstrapStage::Stopped);

    served?;

    Ok(BootstrapReport {
        stages: progress.stages,
        local_addr,
    })
}
