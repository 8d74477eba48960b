use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use codebank_api::bootstrap::setup_transaction_use_case;
use codebank_api::server::RpcServer;
use codebank_core::TransactionId;
use codebank_events::InMemoryProducer;
use codebank_infra::{InMemoryTransactionRepository, TransactionRepository};

struct TestServer {
    base_url: String,
    repository: Arc<InMemoryTransactionRepository>,
    producer: Arc<InMemoryProducer>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same server as prod, in-memory backends, ephemeral port.
        let repository = Arc::new(InMemoryTransactionRepository::new());
        let producer = Arc::new(InMemoryProducer::new());
        let use_case = setup_transaction_use_case(repository.clone(), producer.clone(), "transactions");

        let listener = RpcServer::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let server = RpcServer::new(use_case);
        let handle = tokio::spawn(async move {
            server
                .serve(listener, std::future::pending::<()>())
                .await
                .unwrap();
        });

        Self {
            base_url,
            repository,
            producer,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_always_ok() {
    let server = TestServer::spawn().await;
    server.repository.set_offline(true);

    let res = reqwest::get(server.url("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn ready_follows_store_availability() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/ready")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    server.repository.set_offline(true);
    let res = client.get(server.url("/ready")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_ready");
}

#[tokio::test]
async fn submitted_transaction_is_stored_published_and_readable() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/transactions"))
        .json(&json!({ "account": "acc-1", "amount": 125.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["payload"]["account"], "acc-1");

    let published = server.producer.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic(), "transactions");
    assert_eq!(published[0].key(), id);

    let res = client
        .get(server.url(&format!("/transactions/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn non_object_payload_is_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/transactions"))
        .json(&json!(["not", "an", "object"]))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(server.repository.is_empty());
    assert!(server.producer.published().is_empty());
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url(&format!("/transactions/{}", TransactionId::new())))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(server.url("/transactions/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn publish_failure_is_bad_gateway_but_record_is_kept() {
    let server = TestServer::spawn().await;
    server.producer.set_failing(true);
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/transactions"))
        .json(&json!({ "amount": 1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "publish_error");
    assert_eq!(server.repository.len(), 1);
    assert!(server.producer.published().is_empty());
}

#[tokio::test]
async fn store_outage_is_service_unavailable() {
    let server = TestServer::spawn().await;
    server.repository.set_offline(true);
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/transactions"))
        .json(&json!({ "amount": 1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(server.producer.published().is_empty());
    assert!(server.repository.find_by_id(TransactionId::new()).await.is_err());
}
