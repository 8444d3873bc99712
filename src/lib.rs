//! Single Database - record DAO and remote cache facades
//!
//! Two independent facades: [`RecordStore`] for CRUD over user rows through
//! sqlx, and [`CacheFacade`] for string, hash and expiry operations over redis.
//! Both take their client as a constructor argument.

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod tasks;

pub use cache::{CacheFacade, KeyTtl, KvBackend, MemoryBackend, RedisBackend};
pub use config::Config;
pub use error::{Result, StoreError};
pub use record::{RecordStore, SqlRecordStore, User};
pub use tasks::spawn_purge_task;
