//! TTL Purge Task
//!
//! Background task that periodically drops expired entries from a
//! [`MemoryBackend`]. Reads already skip expired entries; the purge only
//! reclaims their memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryBackend;

/// Spawns a background task that periodically purges expired entries.
///
/// # Arguments
/// * `backend` - Shared handle to the backend, typically also held by a `CacheFacade`
/// * `purge_interval_secs` - Interval in seconds between purge runs
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to stop purging.
///
/// # Example
/// ```ignore
/// let backend = Arc::new(MemoryBackend::new());
/// let cache = CacheFacade::from_shared(backend.clone());
/// let purge_handle = spawn_purge_task(backend, config.purge_interval);
/// // Later, during shutdown:
/// purge_handle.abort();
/// ```
pub fn spawn_purge_task(backend: Arc<MemoryBackend>, purge_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(purge_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL purge task with interval of {} seconds",
            purge_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = backend.purge_expired().await;

            if removed > 0 {
                info!("TTL purge: removed {} expired entries", removed);
            } else {
                debug!("TTL purge: no expired entries found");
            }
        }
    })
}
