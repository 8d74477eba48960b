//! HTTP API application wiring (Axum router).
//!
//! - `routes/`: handlers (one file per area)
//! - `dto.rs`: response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, extract::DefaultBodyLimit, routing::get};
use tower::ServiceBuilder;

use codebank_infra::TransactionUseCase;

pub mod dto;
pub mod errors;
pub mod routes;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the full router around a wired use-case.
pub fn build_app(use_case: Arc<TransactionUseCase>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .route("/ready", get(routes::system::ready))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                .layer(Extension(use_case)),
        )
}
