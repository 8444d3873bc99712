//! Cache Module
//!
//! Facade over a remote key/value store: scalar and hash values, key
//! enumeration, key lifecycle and expiry, plus conditional set.

mod backend;
mod entry;
mod facade;
mod memory;
mod pattern;
mod redis_backend;


// Re-export public types
pub use backend::{KeyTtl, KvBackend};
pub use entry::{CacheEntry, Payload};
pub use facade::CacheFacade;
pub use memory::MemoryBackend;
pub use pattern::KeyPattern;
pub use redis_backend::RedisBackend;
