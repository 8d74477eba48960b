//! Database adapters: connection settings and pool lifecycle.
//!
//! Opening the pool is **lazy**: no connection is attempted (and nothing is
//! pinged) until the first query. Misconfiguration that can be detected
//! up-front (e.g. a non-numeric port) fails here; unreachable hosts surface on
//! first use.

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseSettings;

const APPLICATION_NAME: &str = "codebank";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_USER: &str = "postgres";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("invalid port '{value}': {message}")]
    InvalidPort { value: String, message: String },
}

impl DatabaseSettings {
    /// Render the key/value connection string.
    ///
    /// Field order is fixed (`host port user password dbname`) and TLS is
    /// always disabled.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={} sslmode=disable",
            self.host, self.port, self.user, self.password, self.dbname
        )
    }

    /// Same as [`connection_string`](Self::connection_string) with the password masked.
    pub fn redacted_connection_string(&self) -> String {
        let password = if self.password.is_empty() { "" } else { "****" };
        format!(
            "host={} port={} user={} password={} dbname={} sslmode=disable",
            self.host, self.port, self.user, password, self.dbname
        )
    }

    /// Translate the settings into driver options.
    ///
    /// Every field is set explicitly so the driver never falls back to the
    /// `PG*` environment variables. Empty fields take the `DEFAULT_*` values;
    /// an empty `dbname` means the database named after the user.
    pub fn connect_options(&self) -> Result<PgConnectOptions, DatabaseError> {
        let port = match self.port.trim() {
            "" => DEFAULT_PORT,
            raw => raw.parse::<u16>().map_err(|e| DatabaseError::InvalidPort {
                value: self.port.clone(),
                message: e.to_string(),
            })?,
        };
        let host = or_default(&self.host, DEFAULT_HOST);
        let user = or_default(&self.user, DEFAULT_USER);
        let dbname = or_default(&self.dbname, user);

        Ok(PgConnectOptions::new_without_pgpass()
            .host(host)
            .port(port)
            .username(user)
            .password(&self.password)
            .database(dbname)
            .ssl_mode(PgSslMode::Disable)
            .application_name(APPLICATION_NAME))
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}

/// Open a pooled handle to Postgres without connecting.
///
/// Must be called from within a tokio runtime.
pub fn open_pool(settings: &DatabaseSettings) -> Result<PgPool, DatabaseError> {
    let options = settings.connect_options()?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_lazy_with(options);

    info!(
        dsn = %settings.redacted_connection_string(),
        max_connections = settings.max_connections,
        "database pool opened"
    );

    Ok(pool)
}

/// Close the pool, waiting for checked-out connections to be returned.
pub async fn close_pool(pool: &PgPool) {
    pool.close().await;
    info!("database pool closed");
}
