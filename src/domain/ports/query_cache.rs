//! Query Cache Port
//!
//! Defines the interface for caching normalized responses by address.

use crate::domain::entities::CanonicalResponse;
use std::time::Duration;

/// TTL cache of normalized responses keyed by resolved address.
///
/// Implementations must be safe for concurrent use. A miss followed by a
/// fetch and a set is not atomic across callers.
pub trait QueryCache: Send + Sync {
    /// Get a live entry. Expired entries are treated as absent.
    fn get(&self, key: &str) -> Option<CanonicalResponse>;

    /// Insert or overwrite an entry with an explicit TTL.
    fn set(&self, key: String, value: CanonicalResponse, ttl: Duration);

    /// Insert or overwrite an entry with the cache's default TTL.
    fn set_default(&self, key: String, value: CanonicalResponse);

    /// Remove every expired entry, returning how many were removed.
    fn remove_expired(&self) -> usize;

    /// Number of stored entries, expired or not.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
