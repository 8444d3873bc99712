//! Configuration Module
//!
//! Handles loading connection settings for both facades from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Connection configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote key/value store URL
    pub redis_url: String,
    /// Relational store URL (`mysql://...` or `sqlite:...`)
    pub database_url: String,
    /// Maximum pooled connections to the relational store
    pub db_max_connections: u32,
    /// Seconds to wait for a pooled connection before failing
    pub db_acquire_timeout: u64,
    /// Interval in seconds between purges of the in-process backend
    pub purge_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Key/value store URL (default: redis://127.0.0.1:6379/)
    /// - `DATABASE_URL` - Relational store URL (default: sqlite::memory:)
    /// - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
    /// - `DB_ACQUIRE_TIMEOUT` - Pool acquire timeout in seconds (default: 30)
    /// - `PURGE_INTERVAL` - Purge frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_max_connections),
            db_acquire_timeout: env::var("DB_ACQUIRE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_acquire_timeout),
            purge_interval: env::var("PURGE_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.purge_interval),
        }
    }

    /// Rejects values the clients cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.db_max_connections == 0 {
            return Err(StoreError::Config(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        if self.purge_interval == 0 {
            return Err(StoreError::Config(
                "PURGE_INTERVAL must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Pool acquire timeout as a Duration.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379/".to_string(),
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 5,
            db_acquire_timeout: 30,
            purge_interval: 1,
        }
    }
}
