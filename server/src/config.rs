//! Configuration management for the PortGate server.
//!
//! Loads configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storage backend selection
    pub storage: StorageConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Notarization ledger configuration
    pub notary: NotaryConfig,
}

/// Which backing store the engine runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process maps; suitable for tests and single-node trials
    Memory,
    /// `PostgreSQL` via the `portgate-postgres` repositories
    Postgres,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Selected backend
    pub backend: StorageBackend,
    /// `PostgreSQL` connection URL (required for the postgres backend)
    pub database_url: Option<String>,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub connect_timeout: u64,
    /// Idle timeout in seconds
    pub idle_timeout: u64,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Metrics server host (for Prometheus scraping)
    pub metrics_host: String,
    /// Metrics server port
    pub metrics_port: u16,
}

/// Notarization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotaryConfig {
    /// External ledger endpoint; when unset the engine runs degraded and
    /// every notarization attempt is recorded as failed
    pub ledger_url: Option<String>,
    /// Bound on each external ledger write, in milliseconds
    pub timeout_ms: u64,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("invalid {key}: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is set but unparsable, or when the
    /// postgres backend is selected without `DATABASE_URL`.
    pub fn from_env() -> Result<Self> {
        let backend = match var_or("STORAGE_BACKEND", "memory").to_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "postgres" => StorageBackend::Postgres,
            other => anyhow::bail!("unknown STORAGE_BACKEND: {other}"),
        };
        let database_url = env::var("DATABASE_URL").ok();
        if backend == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("STORAGE_BACKEND=postgres requires DATABASE_URL");
        }

        Ok(Self {
            storage: StorageConfig {
                backend,
                database_url,
                max_connections: parse_var("PG_MAX_CONNECTIONS", 16)?,
                min_connections: parse_var("PG_MIN_CONNECTIONS", 1)?,
                connect_timeout: parse_var("PG_CONNECT_TIMEOUT", 5)?,
                idle_timeout: parse_var("PG_IDLE_TIMEOUT", 300)?,
            },
            server: ServerConfig {
                host: var_or("SERVER_HOST", "0.0.0.0"),
                port: parse_var("SERVER_PORT", 8080)?,
                metrics_host: var_or("METRICS_HOST", "0.0.0.0"),
                metrics_port: parse_var("METRICS_PORT", 9100)?,
            },
            notary: NotaryConfig {
                ledger_url: env::var("NOTARY_LEDGER_URL").ok(),
                timeout_ms: parse_var("NOTARY_TIMEOUT_MS", 3000)?,
            },
        })
    }
}
