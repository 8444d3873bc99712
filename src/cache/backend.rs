//! Key/Value Backend Module
//!
//! The client seam under [`CacheFacade`](crate::cache::CacheFacade). Values
//! cross this boundary already serialized.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, StoreError};

/// Largest relative expiry, in seconds, whose deadline still fits in milliseconds.
const MAX_EXPIRE_SECS: u64 = (i64::MAX / 1000) as u64;

// == Key TTL ==
/// Remaining lifetime of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// The key does not exist
    Missing,
    /// The key exists without an expiry
    Persistent,
    /// The key expires after the given duration
    Expires(Duration),
}

impl KeyTtl {
    /// Interprets a `PTTL` reply: -2 for a missing key, -1 for no expiry.
    pub fn from_millis_reply(reply: i64) -> Self {
        match reply {
            -1 => KeyTtl::Persistent,
            ms if ms < 0 => KeyTtl::Missing,
            ms => KeyTtl::Expires(Duration::from_millis(ms as u64)),
        }
    }

    /// Remaining lifetime, if the key expires.
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            KeyTtl::Expires(remaining) => Some(*remaining),
            _ => None,
        }
    }
}

// == Expiry Arguments ==
/// Checks a relative expiry for `EXPIRE` and returns it as the signed argument
/// the store takes. Zero is allowed and deletes the key.
pub(crate) fn expire_secs_arg(key: &str, ttl_secs: u64) -> Result<i64> {
    if ttl_secs > MAX_EXPIRE_SECS {
        return Err(StoreError::InvalidExpireTime(key.to_string()));
    }
    Ok(ttl_secs as i64)
}

/// Checks the expiry attached to a write. Zero is rejected, as `SET .. EX 0` is.
pub(crate) fn write_expiry_arg(key: &str, ttl_secs: Option<u64>) -> Result<Option<u64>> {
    match ttl_secs {
        None => Ok(None),
        Some(0) => Err(StoreError::InvalidExpireTime(key.to_string())),
        Some(secs) => expire_secs_arg(key, secs).map(|_| Some(secs)),
    }
}

// == KV Backend ==
/// Primitive commands of a remote key/value store.
///
/// Each method maps to one store command. Implementations must not retry or
/// cache; failures are returned as reported.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// All live keys matching a glob pattern.
    async fn keys(&self, pattern: &str) -> Result<HashSet<String>>;

    /// Renames `key`, failing when it does not exist.
    async fn rename(&self, key: &str, new_key: &str) -> Result<()>;

    /// Removes a key of any shape, returning whether one was removed.
    async fn del(&self, key: &str) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Writes a scalar, replacing any previous value and expiry. A zero
    /// expiry is an error.
    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a scalar only if the key is absent. The expiry, if any, is set
    /// in the same command.
    async fn set_nx(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<bool>;

    async fn hset(&self, key: &str, field: &str, value: String) -> Result<()>;

    async fn hset_all(&self, key: &str, fields: Vec<(String, String)>) -> Result<()>;

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// The whole hash, empty when the key is absent.
    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;

    async fn hexists(&self, key: &str, field: &str) -> Result<bool>;

    /// Sets a relative expiry. False when the key is absent.
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool>;

    /// Sets an absolute expiry in Unix seconds. False when the key is absent.
    async fn expire_at(&self, key: &str, unix_secs: i64) -> Result<bool>;

    async fn ttl(&self, key: &str) -> Result<KeyTtl>;

    async fn ping(&self) -> Result<()>;
}
