//! Cache Facade Module
//!
//! Typed operations over an injected [`KvBackend`]. Payloads are any serde type,
//! stored as JSON text.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::{KeyTtl, KvBackend};
use crate::error::Result;

// == Cache Facade ==
/// Thin facade over a key/value backend.
///
/// Holds no state besides the backend handle; every call is one backend
/// command, and failures are returned as the backend reported them. Callers
/// must not mix scalar and hash operations on the same key.
pub struct CacheFacade<B> {
    backend: Arc<B>,
}

impl<B> Clone for CacheFacade<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: KvBackend> CacheFacade<B> {
    // == Constructors ==
    /// Builds a facade that owns its backend.
    pub fn new(backend: B) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    /// Builds a facade over a backend handle shared with other owners.
    pub fn from_shared(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// The backend handle behind this facade.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    // == Key Space ==
    /// Returns every key matching a glob pattern.
    ///
    /// Wildcards are the caller's business. Not paginated: the whole key space
    /// is scanned in one blocking store command.
    pub async fn keys(&self, pattern: &str) -> Result<HashSet<String>> {
        self.backend.keys(pattern).await
    }

    /// Renames a key; fails with the store's error when `key` is absent.
    pub async fn rename_key(&self, key: &str, new_key: &str) -> Result<()> {
        debug!("rename: {} -> {}", key, new_key);
        self.backend.rename(key, new_key).await
    }

    /// Removes a key of any shape. Returns whether a key was removed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        debug!("delete: {}", key);
        self.backend.del(key).await
    }

    /// Whether `key` exists, whatever its shape.
    pub async fn has_key(&self, key: &str) -> Result<bool> {
        self.backend.exists(key).await
    }

    // == Scalar Values ==
    /// Stores a value without expiry, dropping any previous TTL.
    pub async fn set<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<()> {
        debug!("set: {}", key);
        self.backend.set(key, encode(value)?, None).await
    }

    /// Stores a value that expires after `ttl_secs` seconds.
    ///
    /// A zero `ttl_secs` is rejected by the store and nothing is written.
    pub async fn set_ex<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
        ttl_secs: u64,
    ) -> Result<()> {
        debug!("set: {} (ttl {}s)", key, ttl_secs);
        self.backend.set(key, encode(value)?, Some(ttl_secs)).await
    }

    /// Reads and decodes the value at `key`; None when absent.
    pub async fn get<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>> {
        self.backend.get(key).await?.map(decode).transpose()
    }

    // == Hash Values ==
    /// Writes one field of the hash at `key`, creating the hash if needed.
    pub async fn hset<V: Serialize + ?Sized>(
        &self,
        key: &str,
        field: &str,
        value: &V,
    ) -> Result<()> {
        debug!("hset: {}.{}", key, field);
        self.backend.hset(key, field, encode(value)?).await
    }

    /// Writes every pair of `fields` into the hash at `key`. An empty map is a no-op.
    pub async fn hmset<V: Serialize>(
        &self,
        key: &str,
        fields: &HashMap<String, V>,
    ) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let encoded = fields
            .iter()
            .map(|(field, value)| Ok((field.clone(), encode(value)?)))
            .collect::<Result<Vec<_>>>()?;
        debug!("hmset: {} ({} fields)", key, encoded.len());
        self.backend.hset_all(key, encoded).await
    }

    /// Reads one field of the hash at `key`; None when the key or field is absent.
    pub async fn hget<V: DeserializeOwned>(&self, key: &str, field: &str) -> Result<Option<V>> {
        self.backend.hget(key, field).await?.map(decode).transpose()
    }

    /// Reads the whole hash at `key`; empty when the key is absent.
    pub async fn hget_all<V: DeserializeOwned>(&self, key: &str) -> Result<HashMap<String, V>> {
        self.backend
            .hgetall(key)
            .await?
            .into_iter()
            .map(|(field, raw)| Ok((field, decode(raw)?)))
            .collect()
    }

    /// Whether the hash at `key` holds `field`.
    pub async fn has_field(&self, key: &str, field: &str) -> Result<bool> {
        self.backend.hexists(key, field).await
    }

    /// Removes the hash at `key`. Same command as [`CacheFacade::delete`].
    pub async fn delete_key(&self, key: &str) -> Result<bool> {
        self.delete(key).await
    }

    // == Expiry ==
    /// Expires `key` after `ttl_secs` seconds. False when the key is absent.
    pub async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        debug!("expire: {} in {}s", key, ttl_secs);
        self.backend.expire(key, ttl_secs).await
    }

    /// Expires `key` at `at` (second precision). False when the key is absent.
    pub async fn expire_at(&self, key: &str, at: DateTime<Utc>) -> Result<bool> {
        debug!("expire: {} at {}", key, at);
        self.backend.expire_at(key, at.timestamp()).await
    }

    /// Remaining lifetime of `key`.
    pub async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        self.backend.ttl(key).await
    }

    // == Conditional Set ==
    /// Stores `value` only if `key` is absent, returning whether it was stored.
    ///
    /// With `ttl_secs > 0` the expiry is part of the same store command, so it
    /// only ever lands on a key this call created.
    pub async fn set_nx_ex<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
        ttl_secs: u64,
    ) -> Result<bool> {
        let ttl = (ttl_secs > 0).then_some(ttl_secs);
        let stored = self.backend.set_nx(key, encode(value)?, ttl).await?;
        debug!("set_nx: {} stored={}", key, stored);
        Ok(stored)
    }

    /// [`CacheFacade::set_nx_ex`] without expiry.
    pub async fn set_nx<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<bool> {
        self.set_nx_ex(key, value, 0).await
    }

    // == Health ==
    /// Round-trips a `PING` to the store.
    pub async fn ping(&self) -> Result<()> {
        self.backend.ping().await
    }
}

fn encode<V: Serialize + ?Sized>(value: &V) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn decode<V: DeserializeOwned>(raw: String) -> Result<V> {
    Ok(serde_json::from_str(&raw)?)
}
