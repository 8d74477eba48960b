use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use codebank_api::bootstrap::{self, BootstrapError, BootstrapStage, Infrastructure};
use codebank_api::server::ServerError;
use codebank_events::{InMemoryProducer, MessageProducer, ProducerError};
use codebank_infra::{
    DatabaseError, DatabaseSettings, InMemoryTransactionRepository, KafkaSettings,
    TransactionRepository,
};

/// Records every backend call; individual steps can be made to fail.
#[derive(Default)]
struct RecordingInfrastructure {
    calls: Mutex<Vec<&'static str>>,
    fail_database: bool,
    fail_producer: bool,
    repository: Arc<InMemoryTransactionRepository>,
    producer: Arc<InMemoryProducer>,
}

impl RecordingInfrastructure {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Infrastructure for RecordingInfrastructure {
    type Database = ();

    fn open_database(&self, settings: &DatabaseSettings) -> Result<(), DatabaseError> {
        self.record("open_database");
        if self.fail_database {
            return Err(DatabaseError::InvalidPort {
                value: settings.port.clone(),
                message: "rejected".to_string(),
            });
        }
        Ok(())
    }

    fn setup_producer(&self, _settings: &KafkaSettings) -> Result<Arc<dyn MessageProducer>, ProducerError> {
        self.record("setup_producer");
        if self.fail_producer {
            return Err(ProducerError::Setup("no brokers".to_string()));
        }
        let producer: Arc<dyn MessageProducer> = self.producer.clone();
        Ok(producer)
    }

    fn transaction_repository(&self, _database: &()) -> Arc<dyn TransactionRepository> {
        self.record("transaction_repository");
        self.repository.clone()
    }

    async fn close_database(&self, _database: ()) {
        self.record("close_database");
    }
}

fn env_file(dir: &Path, lines: &[&str]) -> PathBuf {
    let path = dir.join(".env");
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

#[tokio::test]
async fn missing_env_file_stops_before_any_backend() {
    let dir = tempfile::tempdir().unwrap();
    let infra = RecordingInfrastructure::default();

    let err = bootstrap::run(&dir.path().join("absent.env"), &infra, std::future::ready(()))
        .await
        .unwrap_err();

    assert!(matches!(err, BootstrapError::Config(_)));
    assert_eq!(err.stage(), BootstrapStage::Start);
    assert!(infra.calls().is_empty());
}

#[tokio::test]
async fn database_failure_stops_before_producer() {
    let dir = tempfile::tempdir().unwrap();
    let path = env_file(dir.path(), &["host=localhost", "ServerAddress=127.0.0.1:0"]);
    let infra = RecordingInfrastructure {
        fail_database: true,
        ..Default::default()
    };

    let err = bootstrap::run(&path, &infra, std::future::ready(()))
        .await
        .unwrap_err();

    assert!(matches!(err, BootstrapError::Database(_)));
    assert_eq!(infra.calls(), vec!["open_database"]);
}

#[tokio::test]
async fn producer_failure_releases_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = env_file(dir.path(), &["ServerAddress=127.0.0.1:0"]);
    let infra = RecordingInfrastructure {
        fail_producer: true,
        ..Default::default()
    };

    let err = bootstrap::run(&path, &infra, std::future::ready(()))
        .await
        .unwrap_err();

    assert!(matches!(err, BootstrapError::Producer(ProducerError::Setup(_))));
    assert_eq!(err.stage(), BootstrapStage::DatabaseOpen);
    assert_eq!(
        infra.calls(),
        vec!["open_database", "setup_producer", "close_database"]
    );
}

#[tokio::test]
async fn clean_run_walks_every_stage_and_releases_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = env_file(
        dir.path(),
        &[
            "host=localhost",
            "port=5432",
            "KafkaBootstrapServers=localhost:9092",
            "ServerAddress=127.0.0.1:0",
        ],
    );
    let infra = RecordingInfrastructure::default();

    let report = bootstrap::run(&path, &infra, std::future::ready(()))
        .await
        .unwrap();

    assert_eq!(
        report.stages,
        vec![
            BootstrapStage::ConfigLoaded,
            BootstrapStage::DatabaseOpen,
            BootstrapStage::ProducerReady,
            BootstrapStage::UseCaseBuilt,
            BootstrapStage::Serving,
            BootstrapStage::Stopped,
        ]
    );
    assert!(report.local_addr.is_some());
    assert_eq!(
        infra.calls(),
        vec![
            "open_database",
            "setup_producer",
            "transaction_repository",
            "close_database",
        ]
    );
    assert_eq!(infra.producer.flush_count(), 1);
}

#[tokio::test]
async fn failed_flush_still_closes_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = env_file(dir.path(), &["ServerAddress=127.0.0.1:0"]);
    let infra = RecordingInfrastructure::default();
    infra.producer.set_failing(true);

    let report = bootstrap::run(&path, &infra, std::future::ready(()))
        .await
        .unwrap();

    assert_eq!(report.stages.last(), Some(&BootstrapStage::Stopped));
    assert_eq!(infra.producer.flush_count(), 1);
    assert_eq!(infra.calls().last(), Some(&"close_database"));
}

#[tokio::test]
async fn unusable_listen_address_releases_resources() {
    let dir = tempfile::tempdir().unwrap();
    let path = env_file(dir.path(), &["ServerAddress=not-an-address"]);
    let infra = RecordingInfrastructure::default();

    let err = bootstrap::run(&path, &infra, std::future::ready(()))
        .await
        .unwrap_err();

    assert!(matches!(err, BootstrapError::Server(ServerError::Bind { .. })));
    assert_eq!(err.stage(), BootstrapStage::UseCaseBuilt);
    assert_eq!(infra.calls().last(), Some(&"close_database"));
    assert_eq!(infra.producer.flush_count(), 1);
}
