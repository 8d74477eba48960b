//! Configuration loading and representation.
//!
//! Configuration is read **once**, at startup, from a `.env`-style file merged
//! with the process environment, and turned into an immutable [`AppConfig`].
//! Everything below the composition root receives the typed settings it needs;
//! nothing else reads the environment.
//!
//! ## Precedence
//!
//! A variable already set in the process environment wins over the file (the
//! file never overrides existing variables). Missing variables become empty
//! strings; they are not validated here and surface later as connection or
//! setup failures.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default location of the environment file, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Default listen address of the transaction RPC server.
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:50052";

/// Default topic that processed transactions are published to.
pub const DEFAULT_TRANSACTIONS_TOPIC: &str = "transactions";

/// Default upper bound of pooled database connections.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Environment variable names, verbatim.
pub mod keys {
    pub const HOST: &str = "host";
    pub const PORT: &str = "port";
    pub const USER: &str = "user";
    pub const PASSWORD: &str = "password";
    pub const DBNAME: &str = "dbname";
    pub const KAFKA_BOOTSTRAP_SERVERS: &str = "KafkaBootstrapServers";

    pub const KAFKA_TRANSACTIONS_TOPIC: &str = "KafkaTransactionsTopic";
    pub const SERVER_ADDRESS: &str = "ServerAddress";
    pub const DB_MAX_CONNECTIONS: &str = "DbMaxConnections";
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The environment file is missing, unreadable or malformed.
    #[error("error loading {}: {message}", path.display())]
    EnvFile { path: PathBuf, message: String },

    /// An optional variable is set but its value cannot be used.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Relational database credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub max_connections: u32,
}

// Hand-written so the password never ends up in logs.
impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Message broker settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaSettings {
    pub bootstrap_servers: String,
    pub transactions_topic: String,
}

/// RPC server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub address: String,
}

/// Process configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub kafka: KafkaSettings,
    pub server: ServerSettings,
}

impl AppConfig {
    /// Load configuration from `env_file` merged with the process environment.
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(env_file: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = env_file.as_ref();
        let entries = read_env_file(path)?;

        tracing::debug!(path = %path.display(), entries = entries.len(), "environment file read");

        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| entries.get(key).cloned()))
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();

        let max_connections = match lookup(keys::DB_MAX_CONNECTIONS).filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => parse_max_connections(&raw)?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let database = DatabaseSettings {
            host: var(keys::HOST),
            port: var(keys::PORT),
            user: var(keys::USER),
            password: var(keys::PASSWORD),
            dbname: var(keys::DBNAME),
            max_connections,
        };

        let kafka = KafkaSettings {
            bootstrap_servers: var(keys::KAFKA_BOOTSTRAP_SERVERS),
            transactions_topic: lookup(keys::KAFKA_TRANSACTIONS_TOPIC)
                .filter(|topic| !topic.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TRANSACTIONS_TOPIC.to_string()),
        };

        let server = ServerSettings {
            address: lookup(keys::SERVER_ADDRESS)
                .filter(|addr| !addr.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
        };

        Ok(Self {
            database,
            kafka,
            server,
        })
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let to_error = |e: dotenvy::Error| ConfigError::EnvFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    dotenvy::from_path_iter(path)
        .map_err(to_error)?
        .map(|item| item.map_err(to_error))
        .collect()
}

fn parse_max_connections(raw: &str) -> Result<u32, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: keys::DB_MAX_CONNECTIONS.to_string(),
        message,
    };

    let value: u32 = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if value == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(value)
}
