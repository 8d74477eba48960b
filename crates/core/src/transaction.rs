//! Transaction records handled by the service.
//!
//! The service does not interpret transaction contents: a payload is an opaque
//! JSON object that is stored and forwarded as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{DomainError, DomainResult};
use crate::id::TransactionId;

/// A transaction submitted for processing (not yet assigned an id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub payload: JsonValue,
}

impl NewTransaction {
    pub fn new(payload: JsonValue) -> Self {
        Self { payload }
    }

    /// Accept the submission, stamping it with an id and receive time.
    ///
    /// The payload must be a JSON object; anything else is rejected.
    pub fn accept(self, id: TransactionId, received_at: DateTime<Utc>) -> DomainResult<Transaction> {
        if !self.payload.is_object() {
            return Err(DomainError::validation("payload must be a JSON object"));
        }

        Ok(Transaction {
            id,
            payload: self.payload,
            received_at,
        })
    }
}

/// A processed transaction, as persisted and published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub payload: JsonValue,
    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accept_keeps_payload_and_stamps() {
        let id = TransactionId::new();
        let now = Utc::now();
        let tx = NewTransaction::new(json!({"amount": 10}))
            .accept(id, now)
            .unwrap();

        assert_eq!(tx.id, id);
        assert_eq!(tx.received_at, now);
        assert_eq!(tx.payload["amount"], 10);
    }

    #[test]
    fn accept_rejects_non_object_payloads() {
        for payload in [json!(null), json!(42), json!("x"), json!([1, 2])] {
            let err = NewTransaction::new(payload)
                .accept(TransactionId::new(), Utc::now())
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }
}
