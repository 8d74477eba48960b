use axum::Router;

pub mod system;
pub mod transactions;

/// Router for the transaction endpoints.
pub fn router() -> Router {
    transactions::router()
}
