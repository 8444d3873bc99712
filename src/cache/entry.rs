//! Cache Entry Module
//!
//! Defines the structure of entries held by the in-process backend.

use std::collections::HashMap;

use chrono::Utc;

// == Payload ==
/// The two value shapes a key can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Opaque serialized value
    Scalar(String),
    /// Field name to serialized value
    Hash(HashMap<String, String>),
}

// == Cache Entry ==
/// Represents a single keyed entry with its expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub payload: Payload,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructors ==
    /// Creates a scalar entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The serialized value to store
    /// * `ttl_seconds` - Optional TTL in seconds
    pub fn scalar(value: String, ttl_seconds: Option<u64>) -> Self {
        let now = current_timestamp_ms();
        Self {
            payload: Payload::Scalar(value),
            expires_at: ttl_seconds.map(|ttl| now.saturating_add(ttl.saturating_mul(1000))),
        }
    }

    /// Creates an empty hash entry without expiry.
    pub fn hash() -> Self {
        Self {
            payload: Payload::Hash(HashMap::new()),
            expires_at: None,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// the expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired (TTL elapsed)
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry has no TTL (never expires)
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
