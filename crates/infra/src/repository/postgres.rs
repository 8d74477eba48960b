//! Postgres-backed transaction repository.
//!
//! Expects a single append-only table:
//!
//! ```sql
//! CREATE TABLE transactions (
//!     id          UUID PRIMARY KEY,
//!     payload     JSONB NOT NULL,
//!     received_at TIMESTAMPTZ NOT NULL
//! );
//! ```
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed / PoolTimedOut / Io / Tls | N/A | `Unavailable` |
//! | Decode / ColumnNotFound | N/A | `Corrupt` |
//! | Other | N/A | `Storage` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use codebank_core::{Transaction, TransactionId};

use super::r#trait::{RepositoryError, TransactionRepository};

/// Postgres transaction repository.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresTransactionRepository {
    pool: Arc<PgPool>,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    #[instrument(skip(self, transaction), fields(transaction_id = %transaction.id), err)]
    async fn save(&self, transaction: &Transaction) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, payload, received_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(&transaction.payload)
        .bind(transaction.received_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save", e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(transaction_id = %id), err)]
    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, payload, received_at
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_id", e))?;

        match row {
            Some(row) => {
                let record = TransactionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Corrupt(format!("failed to read transaction row: {}", e)))?;
                Ok(Some(record.into()))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), err)]
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;

        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => RepositoryError::Duplicate(msg),
                _ => RepositoryError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            RepositoryError::Unavailable(format!("timed out acquiring a connection in {}", operation))
        }
        sqlx::Error::Io(e) => RepositoryError::Unavailable(format!("io error in {}: {}", operation, e)),
        sqlx::Error::Tls(e) => RepositoryError::Unavailable(format!("tls error in {}: {}", operation, e)),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            RepositoryError::Corrupt(format!("{} in {}", err, operation))
        }
        _ => RepositoryError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct TransactionRow {
    id: uuid::Uuid,
    payload: serde_json::Value,
    received_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for TransactionRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(TransactionRow {
            id: row.try_get("id")?,
            payload: row.try_get("payload")?,
            received_at: row.try_get("received_at")?,
        })
    }
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            id: TransactionId::from_uuid(row.id),
            payload: row.payload,
            received_at: row.received_at,
        }
    }
}
