use chrono::{DateTime, Utc};
use serde::Serialize;

use codebank_core::Transaction;

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id.to_string(),
            payload: tx.payload,
            received_at: tx.received_at,
        }
    }
}
