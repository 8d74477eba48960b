use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use codebank_infra::{ProcessError, RepositoryError};

pub fn process_error_to_response(err: ProcessError) -> axum::response::Response {
    match err {
        ProcessError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ProcessError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "transaction not found"),
        ProcessError::Store(RepositoryError::Duplicate(msg)) => {
            json_error(StatusCode::CONFLICT, "conflict", msg)
        }
        ProcessError::Store(RepositoryError::Unavailable(msg)) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
        ProcessError::Store(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
        e @ ProcessError::Publish { .. } => {
            json_error(StatusCode::BAD_GATEWAY, "publish_error", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
