//! Redis Backend Module
//!
//! `KvBackend` over a multiplexed, auto-reconnecting redis connection.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::cache::backend::{expire_secs_arg, write_expiry_arg};
use crate::cache::{KeyTtl, KvBackend};
use crate::config::Config;
use crate::error::Result;

// == Redis Backend ==
/// Issues exactly one redis command per call.
#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
}

impl RedisBackend {
    // == Constructor ==
    /// Wraps an existing connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Opens a connection to the configured `REDIS_URL`.
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        let conn = ConnectionManager::new(client).await?;
        info!("Cache backend connected");
        Ok(Self::new(conn))
    }

    // Handles are cheap clones sharing one multiplexed connection
    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn keys(&self, pattern: &str) -> Result<HashSet<String>> {
        let mut conn = self.conn();
        let keys: HashSet<String> = conn.keys(pattern).await?;
        debug!("KEYS {} -> {} keys", pattern, keys.len());
        Ok(keys)
    }

    async fn rename(&self, key: &str, new_key: &str) -> Result<()> {
        let mut conn = self.conn();
        let _: () = conn.rename(key, new_key).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn();
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn();
        Ok(conn.exists(key).await?)
    }

    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<()> {
        let ttl_secs = write_expiry_arg(key, ttl_secs)?;
        let mut conn = self.conn();
        let _: () = match ttl_secs {
            Some(secs) => conn.set_ex(key, value, secs).await?,
            None => conn.set(key, value).await?,
        };
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn();
        Ok(conn.get(key).await?)
    }

    async fn set_nx(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<bool> {
        let ttl_secs = write_expiry_arg(key, ttl_secs)?;
        let mut conn = self.conn();
        let Some(secs) = ttl_secs else {
            return Ok(conn.set_nx(key, value).await?);
        };

        // SET .. NX EX replies OK when written and nil when the key exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(secs)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn hset(&self, key: &str, field: &str, value: String) -> Result<()> {
        let mut conn = self.conn();
        let _: () = conn.hset(key, field, value).await?;
        Ok(())
    }

    async fn hset_all(&self, key: &str, fields: Vec<(String, String)>) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn();
        let _: () = conn.hset_multiple(key, &fields).await?;
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut conn = self.conn();
        Ok(conn.hget(key, field).await?)
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut conn = self.conn();
        Ok(conn.hgetall(key).await?)
    }

    async fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        let mut conn = self.conn();
        Ok(conn.hexists(key, field).await?)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        let seconds = expire_secs_arg(key, ttl_secs)?;
        let mut conn = self.conn();
        Ok(conn.expire(key, seconds).await?)
    }

    async fn expire_at(&self, key: &str, unix_secs: i64) -> Result<bool> {
        let mut conn = self.conn();
        Ok(conn.expire_at(key, unix_secs).await?)
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let mut conn = self.conn();
        let millis: i64 = conn.pttl(key).await?;
        Ok(KeyTtl::from_millis_reply(millis))
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
