// src/cache/sweeper.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::cache::CacheStore;

/// Spawn the periodic expiry sweep. Lazy expiry on read already guarantees
/// correctness; this keeps dead entries from accumulating between reads.
pub fn spawn_sweeper(cache: Arc<dyn CacheStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a fresh process
        // doesn't log a no-op sweep at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match cache.clear_expired() {
                Ok(removed) if removed > 0 => {
                    tracing::info!(removed, "cache sweep");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = ?e, "cache sweep failed");
                }
            }
        }
    })
}
