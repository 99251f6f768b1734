//! Service configuration loaded from environment variables.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_PATH: &str = "reviewers.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server listens on.
    pub http_addr: SocketAddr,
    /// SQLite database file. Parent directories are created on startup.
    pub database_path: PathBuf,
    pub database_max_connections: u32,
    /// How long in-flight requests get to finish after shutdown is requested.
    pub shutdown_timeout: Duration,
    /// Fixed seed for reviewer selection. Random when unset.
    pub assignment_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            assignment_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// Unset and blank variables fall back to defaults; present but
    /// unparsable values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_addr = parse_http_addr(
            &var("HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string()),
        )
        .context("HTTP_ADDR must be a socket address like 0.0.0.0:8080 or :8080")?;

        let database_path = var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let database_max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let shutdown_timeout = match var("HTTP_SHUTDOWN_TIMEOUT") {
            Some(v) => Duration::from_secs(
                v.trim()
                    .parse::<u64>()
                    .context("HTTP_SHUTDOWN_TIMEOUT must be a number of seconds")?,
            ),
            None => Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        };

        let assignment_seed = var("ASSIGNMENT_SEED")
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("ASSIGNMENT_SEED must be an unsigned integer")?;

        Ok(Config {
            http_addr,
            database_path,
            database_max_connections,
            shutdown_timeout,
            assignment_seed,
        })
    }
}

/// Parse a listen address. A bare `:port` binds all interfaces.
fn parse_http_addr(value: &str) -> Result<SocketAddr, std::net::AddrParseError> {
    let value = value.trim();
    match value.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port).parse(),
        None => value.parse(),
    }
}
