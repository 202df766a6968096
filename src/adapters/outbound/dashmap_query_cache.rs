//! DashMap Query Cache
//!
//! Implements QueryCache using DashMap for sharded concurrent access.
//!
//! Two concurrent misses for the same address may both fetch upstream and
//! both write. The last write wins; no per-key locking is done.

use crate::domain::entities::{CacheEntry, CanonicalResponse};
use crate::domain::ports::QueryCache;
use crate::infrastructure::ShutdownController;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Default time-to-live of a cached response.
pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Default cadence of the background sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// DashMap-backed response cache.
///
/// Expired entries are evicted lazily on read and periodically by
/// [`start_sweep`](Self::start_sweep).
pub struct DashMapQueryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl DashMapQueryCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Start the background sweep task; it exits once `shutdown` fires.
    pub fn start_sweep(
        &self,
        interval: Duration,
        shutdown: &ShutdownController,
    ) -> JoinHandle<()> {
        let entries = self.entries.clone();
        let stopped = shutdown.wait();

        tokio::spawn(async move {
            tokio::pin!(stopped);
            loop {
                tokio::select! {
                    _ = &mut stopped => {
                        tracing::debug!("cache sweep stopped");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        let removed = sweep(&entries, Instant::now());
                        if removed > 0 {
                            tracing::debug!("cache sweep removed {} expired entries", removed);
                        }
                    }
                }
            }
        })
    }
}

impl Default for DashMapQueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

fn sweep(entries: &DashMap<String, CacheEntry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired_at(now));
    before.saturating_sub(entries.len())
}

impl QueryCache for DashMapQueryCache {
    fn get(&self, key: &str) -> Option<CanonicalResponse> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => return Some(entry.value.clone()),
            Some(_) => {}
            None => return None,
        }

        // Read guard is released before taking the write lock on the shard.
        self.entries.remove_if(key, |_, entry| entry.is_expired_at(now));
        None
    }

    fn set(&self, key: String, value: CanonicalResponse, ttl: Duration) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    fn set_default(&self, key: String, value: CanonicalResponse) {
        self.set(key, value, self.default_ttl);
    }

    fn remove_expired(&self) -> usize {
        sweep(&self.entries, Instant::now())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
