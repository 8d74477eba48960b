use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use codebank_infra::TransactionUseCase;

use crate::app::errors;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Readiness: the database answers a round-trip.
pub async fn ready(Extension(use_case): Extension<Arc<TransactionUseCase>>) -> axum::response::Response {
    match use_case.ready().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "ready" }))).into_response(),
        Err(e) => errors::json_error(StatusCode::SERVICE_UNAVAILABLE, "not_ready", e.to_string()),
    }
}
