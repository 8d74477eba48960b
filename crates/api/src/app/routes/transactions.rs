use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use codebank_core::{NewTransaction, TransactionId};
use codebank_infra::TransactionUseCase;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/transactions", post(process_transaction))
        .route("/transactions/:id", get(get_transaction))
}

pub async fn process_transaction(
    Extension(use_case): Extension<Arc<TransactionUseCase>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    match use_case.process(NewTransaction::new(body)).await {
        Ok(tx) => (StatusCode::CREATED, Json(dto::TransactionResponse::from(tx))).into_response(),
        Err(e) => errors::process_error_to_response(e),
    }
}

pub async fn get_transaction(
    Extension(use_case): Extension<Arc<TransactionUseCase>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: TransactionId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("{e}")),
    };

    match use_case.find(id).await {
        Ok(tx) => Json(dto::TransactionResponse::from(tx)).into_response(),
        Err(e) => errors::process_error_to_response(e),
    }
}
