//! Memory Backend Module
//!
//! In-process `KvBackend` that follows the remote store's command semantics.
//! Used as the substitute client in tests and for embedded setups.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::backend::{expire_secs_arg, write_expiry_arg};
use crate::cache::entry::{current_timestamp_ms, CacheEntry, Payload};
use crate::cache::{KeyPattern, KeyTtl, KvBackend};
use crate::error::{Result, StoreError};

// == Memory Backend ==
/// HashMap-backed store with lazy TTL expiration.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryBackend {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Purge Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|entry| !entry.is_expired()).count()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Returns the entry at `key` if it is live, dropping it if it has expired.
fn live_entry<'a>(
    entries: &'a mut HashMap<String, CacheEntry>,
    key: &str,
) -> Option<&'a mut CacheEntry> {
    if entries.get(key).is_some_and(CacheEntry::is_expired) {
        entries.remove(key);
        return None;
    }
    entries.get_mut(key)
}

/// Returns the hash at `key`, creating an empty one when absent.
fn hash_entry<'a>(
    entries: &'a mut HashMap<String, CacheEntry>,
    key: &str,
) -> Result<&'a mut HashMap<String, String>> {
    if live_entry(entries, key).is_none() {
        entries.insert(key.to_string(), CacheEntry::hash());
    }
    match entries.get_mut(key).map(|entry| &mut entry.payload) {
        Some(Payload::Hash(fields)) => Ok(fields),
        _ => Err(StoreError::WrongType(key.to_string())),
    }
}

/// Read-only view of the hash at `key`; None when absent.
fn existing_hash<'a>(
    entries: &'a mut HashMap<String, CacheEntry>,
    key: &str,
) -> Result<Option<&'a HashMap<String, String>>> {
    match live_entry(entries, key).map(|entry| &entry.payload) {
        None => Ok(None),
        Some(Payload::Hash(fields)) => Ok(Some(fields)),
        Some(Payload::Scalar(_)) => Err(StoreError::WrongType(key.to_string())),
    }
}

/// Moves the deadline of a live key. A deadline already passed deletes the key.
fn set_deadline(entries: &mut HashMap<String, CacheEntry>, key: &str, deadline_ms: u64) -> bool {
    let Some(entry) = live_entry(entries, key) else {
        return false;
    };
    if deadline_ms <= current_timestamp_ms() {
        entries.remove(key);
    } else {
        entry.expires_at = Some(deadline_ms);
    }
    true
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn keys(&self, pattern: &str) -> Result<HashSet<String>> {
        let pattern = KeyPattern::new(pattern)?;
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired());
        Ok(entries
            .keys()
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect())
    }

    async fn rename(&self, key: &str, new_key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        let entry = match entries.remove(key) {
            Some(entry) if !entry.is_expired() => entry,
            _ => return Err(StoreError::NoSuchKey(key.to_string())),
        };
        entries.insert(new_key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries
            .remove(key)
            .is_some_and(|entry| !entry.is_expired()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        Ok(live_entry(&mut entries, key).is_some())
    }

    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<()> {
        let ttl_secs = write_expiry_arg(key, ttl_secs)?;
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry::scalar(value, ttl_secs));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().await;
        match live_entry(&mut entries, key).map(|entry| &entry.payload) {
            None => Ok(None),
            Some(Payload::Scalar(value)) => Ok(Some(value.clone())),
            Some(Payload::Hash(_)) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn set_nx(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<bool> {
        let ttl_secs = write_expiry_arg(key, ttl_secs)?;
        let mut entries = self.entries.write().await;
        if live_entry(&mut entries, key).is_some() {
            debug!("set_nx: key {} already present", key);
            return Ok(false);
        }
        entries.insert(key.to_string(), CacheEntry::scalar(value, ttl_secs));
        Ok(true)
    }

    async fn hset(&self, key: &str, field: &str, value: String) -> Result<()> {
        let mut entries = self.entries.write().await;
        hash_entry(&mut entries, key)?.insert(field.to_string(), value);
        Ok(())
    }

    async fn hset_all(&self, key: &str, fields: Vec<(String, String)>) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut entries = self.entries.write().await;
        hash_entry(&mut entries, key)?.extend(fields);
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().await;
        Ok(existing_hash(&mut entries, key)?.and_then(|fields| fields.get(field).cloned()))
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut entries = self.entries.write().await;
        Ok(existing_hash(&mut entries, key)?
            .cloned()
            .unwrap_or_default())
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        Ok(existing_hash(&mut entries, key)?.is_some_and(|fields| fields.contains_key(field)))
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        let ttl_secs = expire_secs_arg(key, ttl_secs)? as u64;
        let deadline = current_timestamp_ms().saturating_add(ttl_secs * 1000);
        let mut entries = self.entries.write().await;
        Ok(set_deadline(&mut entries, key, deadline))
    }

    async fn expire_at(&self, key: &str, unix_secs: i64) -> Result<bool> {
        let deadline = (unix_secs.max(0) as u64).saturating_mul(1000);
        let mut entries = self.entries.write().await;
        Ok(set_deadline(&mut entries, key, deadline))
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let mut entries = self.entries.write().await;
        Ok(match live_entry(&mut entries, key).map(|entry| entry.ttl_remaining_ms()) {
            None => KeyTtl::Missing,
            Some(None) => KeyTtl::Persistent,
            Some(Some(ms)) => KeyTtl::Expires(std::time::Duration::from_millis(ms)),
        })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
