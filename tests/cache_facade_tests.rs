//! Integration Tests for the Cache Facade
//!
//! Exercises the facade over the in-process backend. The `live_redis` suite
//! runs the same contracts against a real server:
//! `REDIS_URL=redis://127.0.0.1:6379/ cargo test -- --ignored`

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use single_database::cache::KeyTtl;
use single_database::{
    spawn_purge_task, CacheFacade, Config, KvBackend, MemoryBackend, StoreError, User,
};

// == Helper Functions ==

fn create_test_cache() -> CacheFacade<MemoryBackend> {
    CacheFacade::new(MemoryBackend::new())
}

/// Contracts shared by every backend. Keys are namespaced so a live server
/// can be reused between runs.
async fn check_backend_contracts<B: KvBackend>(cache: &CacheFacade<B>, ns: &str) {
    let key = |name: &str| format!("{ns}:{name}");
    for name in ["s", "h", "nx", "nx_ttl", "old", "new", "exp", "missing"] {
        cache.delete(&key(name)).await.unwrap();
    }

    // Scalar round trip
    cache.set(&key("s"), "value").await.unwrap();
    assert_eq!(
        cache.get::<String>(&key("s")).await.unwrap(),
        Some("value".to_string())
    );
    assert!(cache.has_key(&key("s")).await.unwrap());
    assert_eq!(cache.get::<String>(&key("missing")).await.unwrap(), None);

    // Hash round trip
    cache.hset(&key("h"), "f", &7).await.unwrap();
    assert_eq!(cache.hget::<i32>(&key("h"), "f").await.unwrap(), Some(7));
    assert_eq!(cache.hget::<i32>(&key("h"), "g").await.unwrap(), None);
    assert!(cache.has_field(&key("h"), "f").await.unwrap());
    assert!(!cache.has_field(&key("h"), "g").await.unwrap());
    let all: HashMap<String, i32> = cache.hget_all(&key("h")).await.unwrap();
    assert_eq!(all.get("f"), Some(&7));

    // Conditional set
    assert!(cache.set_nx(&key("nx"), "first").await.unwrap());
    assert!(!cache.set_nx(&key("nx"), "second").await.unwrap());
    assert_eq!(
        cache.get::<String>(&key("nx")).await.unwrap(),
        Some("first".to_string())
    );
    assert!(cache.set_nx_ex(&key("nx_ttl"), "v", 60).await.unwrap());
    let remaining = cache.ttl(&key("nx_ttl")).await.unwrap().remaining().unwrap();
    assert!(remaining <= Duration::from_secs(60));
    assert!(remaining >= Duration::from_secs(58));

    // Rename
    assert!(cache.rename_key(&key("missing"), &key("new")).await.is_err());
    cache.set(&key("old"), &42).await.unwrap();
    cache.rename_key(&key("old"), &key("new")).await.unwrap();
    assert_eq!(cache.get::<i32>(&key("new")).await.unwrap(), Some(42));
    assert!(!cache.has_key(&key("old")).await.unwrap());

    // Expiry on missing and present keys
    assert!(!cache.expire(&key("missing"), 10).await.unwrap());
    assert!(!cache
        .expire_at(&key("missing"), Utc::now() + chrono::Duration::seconds(10))
        .await
        .unwrap());
    cache.set(&key("exp"), "v").await.unwrap();
    assert!(cache.expire(&key("exp"), 1).await.unwrap());
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(!cache.has_key(&key("exp")).await.unwrap());

    // Pattern listing
    let listed = cache.keys(&format!("{ns}:n*")).await.unwrap();
    assert_eq!(
        listed,
        HashSet::from([key("nx"), key("nx_ttl"), key("new")])
    );

    cache.ping().await.unwrap();
}

// == Shared Contracts ==

#[tokio::test]
async fn test_memory_backend_contracts() {
    check_backend_contracts(&create_test_cache(), "it").await;
}

// == Key Space ==

#[tokio::test]
async fn test_keys_with_pattern() {
    let cache = create_test_cache();

    cache.set("user:1", "a").await.unwrap();
    cache.set("user:2", "b").await.unwrap();
    cache.set("user:10", "c").await.unwrap();
    cache.hset("order:1", "total", &5).await.unwrap();

    let single_digit = cache.keys("user:?").await.unwrap();
    assert_eq!(
        single_digit,
        HashSet::from(["user:1".to_string(), "user:2".to_string()])
    );
    assert_eq!(cache.keys("*").await.unwrap().len(), 4);
    assert!(cache.keys("session:*").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rename_missing_key_is_store_error() {
    let cache = create_test_cache();

    let result = cache.rename_key("absent", "other").await;

    assert!(matches!(result, Err(StoreError::NoSuchKey(key)) if key == "absent"));
}

#[tokio::test]
async fn test_delete_removes_any_shape() {
    let cache = create_test_cache();

    cache.set("scalar", "v").await.unwrap();
    cache.hset("hash", "f", "v").await.unwrap();

    assert!(cache.delete("scalar").await.unwrap());
    assert!(cache.delete_key("hash").await.unwrap());
    assert!(!cache.has_key("scalar").await.unwrap());
    assert!(!cache.has_key("hash").await.unwrap());
}

// == Scalar Values ==

#[tokio::test]
async fn test_record_as_payload() {
    let cache = create_test_cache();
    let user = User::new(1).with_name("Ada").with_age(36);

    cache.set_ex("user:1", &user, 300).await.unwrap();

    assert_eq!(cache.get::<User>("user:1").await.unwrap(), Some(user));
    assert!(cache.ttl("user:1").await.unwrap().remaining().is_some());
}

#[tokio::test]
async fn test_set_ex_expires() {
    let cache = create_test_cache();

    cache.set_ex("short", "v", 1).await.unwrap();
    assert!(cache.has_key("short").await.unwrap());

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(cache.get::<String>("short").await.unwrap(), None);
}

#[tokio::test]
async fn test_mixing_shapes_surfaces_error() {
    let cache = create_test_cache();

    cache.set("k", "scalar").await.unwrap();

    let result = cache.hset("k", "f", "v").await;
    assert!(matches!(result, Err(StoreError::WrongType(_))));
}

// == Hash Values ==

#[tokio::test]
async fn test_hmset_and_full_read() {
    let cache = create_test_cache();
    let fields = HashMap::from([
        ("name".to_string(), "Ada".to_string()),
        ("lang".to_string(), "en".to_string()),
    ]);

    cache.hmset("profile:1", &fields).await.unwrap();
    cache.hset("profile:1", "lang", "fr").await.unwrap();

    let all: HashMap<String, String> = cache.hget_all("profile:1").await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all["name"], "Ada");
    assert_eq!(all["lang"], "fr");
}

#[tokio::test]
async fn test_hget_all_missing_key_is_empty() {
    let cache = create_test_cache();

    let all: HashMap<String, String> = cache.hget_all("nothing").await.unwrap();
    assert!(all.is_empty());
}

// == Expiry ==

#[tokio::test]
async fn test_expire_at_future_and_past() {
    let cache = create_test_cache();

    cache.set("a", &1).await.unwrap();
    cache.set("b", &2).await.unwrap();

    let later = Utc::now() + chrono::Duration::seconds(120);
    assert!(cache.expire_at("a", later).await.unwrap());
    let remaining = cache.ttl("a").await.unwrap().remaining().unwrap();
    assert!(remaining > Duration::from_secs(100));

    let earlier = Utc::now() - chrono::Duration::seconds(5);
    assert!(cache.expire_at("b", earlier).await.unwrap());
    assert!(!cache.has_key("b").await.unwrap());
}

#[tokio::test]
async fn test_set_without_ttl_is_persistent() {
    let cache = create_test_cache();

    cache.set("p", "v").await.unwrap();

    assert_eq!(cache.ttl("p").await.unwrap(), KeyTtl::Persistent);
    assert_eq!(cache.ttl("none").await.unwrap(), KeyTtl::Missing);
}

// == Conditional Set ==

#[tokio::test]
async fn test_losing_set_nx_keeps_holder_ttl() {
    let cache = create_test_cache();

    assert!(cache.set_nx_ex("lock:job", "worker-a", 60).await.unwrap());
    assert!(!cache.set_nx_ex("lock:job", "worker-b", 1).await.unwrap());

    let remaining = cache.ttl("lock:job").await.unwrap().remaining().unwrap();
    assert!(remaining > Duration::from_secs(50));
    assert_eq!(
        cache.get::<String>("lock:job").await.unwrap(),
        Some("worker-a".to_string())
    );
}

#[tokio::test]
async fn test_concurrent_set_nx_has_one_winner() {
    let cache = create_test_cache();

    let attempts: Vec<_> = (0..16)
        .map(|i| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.set_nx_ex("lock:race", &i, 30).await.unwrap() })
        })
        .collect();

    let mut winners = 0;
    for attempt in attempts {
        if attempt.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

// == Purge Task ==

#[tokio::test]
async fn test_purge_task_with_shared_backend() {
    let backend = Arc::new(MemoryBackend::new());
    let cache = CacheFacade::from_shared(backend.clone());
    let config = Config::default();

    cache.set_ex("temp", "v", 1).await.unwrap();
    cache.set("kept", "v").await.unwrap();

    let handle = spawn_purge_task(backend.clone(), config.purge_interval);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    handle.abort();

    assert_eq!(backend.purge_expired().await, 0);
    assert_eq!(backend.len().await, 1);
    assert!(cache.has_key("kept").await.unwrap());
}

// == Live Redis ==

mod live_redis {
    use super::*;
    use single_database::RedisBackend;

    async fn connect() -> CacheFacade<RedisBackend> {
        single_database::logging::init_tracing();
        let backend = RedisBackend::connect(&Config::from_env()).await.unwrap();
        CacheFacade::new(backend)
    }

    #[tokio::test]
    #[ignore = "requires a running redis server at REDIS_URL"]
    async fn test_redis_backend_contracts() {
        let cache = connect().await;
        check_backend_contracts(&cache, "single_database_it").await;
    }

    #[tokio::test]
    #[ignore = "requires a running redis server at REDIS_URL"]
    async fn test_redis_hset_on_scalar_is_redis_error() {
        let cache = connect().await;
        let key = "single_database_it:wrongtype";
        cache.set(key, "scalar").await.unwrap();

        let result = cache.hset(key, "f", "v").await;
        assert!(matches!(result, Err(StoreError::Redis(_))));

        cache.delete(key).await.unwrap();
    }
}
