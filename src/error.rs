//! Error types for the data-access facades
//!
//! Provides unified error handling using thiserror. Client failures pass
//! through untouched so callers see the store's own error.

use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for the record store and cache facade.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failure reported by the remote key/value client
    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    /// Failure reported by the relational statement client
    #[error(transparent)]
    Sql(#[from] sqlx::Error),

    /// Payload could not be encoded or decoded
    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation requires an existing key
    #[error("No such key: {0}")]
    NoSuchKey(String),

    /// Operation applied to a key holding the other value shape
    #[error("Wrong kind of value at key: {0}")]
    WrongType(String),

    /// Expiry of zero or beyond the store's range
    #[error("Invalid expire time for key: {0}")]
    InvalidExpireTime(String),

    /// Key pattern could not be compiled
    #[error("Invalid key pattern: {0}")]
    InvalidPattern(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

// == Result Type Alias ==
/// Convenience Result type for the facades.
pub type Result<T> = std::result::Result<T, StoreError>;
