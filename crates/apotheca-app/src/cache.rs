//! Query result cache
//!
//! Results are cached under a [`QueryKey`]. Writes invalidate keys so the
//! next read goes back to the backend.

use crate::config::cache::STALE_TIME_SECS;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Identity of a cached query: a short list of strings such as
/// `["cms-page", "about-us"]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Build a key from its parts
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Key parts in order
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Whether `prefix` names this key or one of its ancestors
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Cache collaborator used by the services
pub trait QueryCache: Send + Sync {
    /// Cached value for `key`, if present and fresh
    fn get(&self, key: &QueryKey) -> Option<Value>;

    /// Store a freshly fetched value
    fn put(&self, key: QueryKey, value: Value);

    /// Drop `key` and every key it prefixes
    fn invalidate(&self, key: &QueryKey);
}

struct Entry {
    value: Value,
    stored_at: Instant,
}

/// In-process cache with a fixed stale time
pub struct MemoryQueryCache {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    stale_time: Duration,
}

impl MemoryQueryCache {
    /// Create a cache with the default stale time
    pub fn new() -> Self {
        Self::with_stale_time(Duration::from_secs(STALE_TIME_SECS))
    }

    /// Create a cache whose entries go stale after `stale_time`
    pub fn with_stale_time(stale_time: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            stale_time,
        }
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryQueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache for MemoryQueryCache {
    fn get(&self, key: &QueryKey) -> Option<Value> {
        let mut entries = self.lock();
        let fresh = entries
            .get(key)
            .map(|entry| entry.stored_at.elapsed() < self.stale_time)?;
        if !fresh {
            debug!(%key, "cache entry stale");
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    fn put(&self, key: QueryKey, value: Value) {
        self.lock().insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    fn invalidate(&self, key: &QueryKey) {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(key));
        debug!(%key, dropped = before - entries.len(), "cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_display() {
        assert_eq!(QueryKey::new(["cms-page", "about"]).to_string(), "[cms-page, about]");
    }

    #[test]
    fn test_key_prefix() {
        let list = QueryKey::new(["cms-pages"]);
        let single = QueryKey::new(["cms-page", "about"]);
        assert!(list.starts_with(&list));
        assert!(single.starts_with(&QueryKey::new(["cms-page"])));
        assert!(!single.starts_with(&list));
    }

    #[test]
    fn test_put_and_get() {
        let cache = MemoryQueryCache::new();
        let key = QueryKey::new(["prescriptions"]);
        assert!(cache.get(&key).is_none());

        cache.put(key.clone(), json!([1, 2]));
        assert_eq!(cache.get(&key), Some(json!([1, 2])));
    }

    #[test]
    fn test_stale_entries_are_dropped() {
        let cache = MemoryQueryCache::with_stale_time(Duration::ZERO);
        let key = QueryKey::new(["prescriptions"]);
        cache.put(key.clone(), json!([]));

        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_exact_and_children() {
        let cache = MemoryQueryCache::new();
        cache.put(QueryKey::new(["blog-post", "a"]), json!({}));
        cache.put(QueryKey::new(["blog-post", "b"]), json!({}));
        cache.put(QueryKey::new(["blog-posts"]), json!([]));

        cache.invalidate(&QueryKey::new(["blog-post"]));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&QueryKey::new(["blog-posts"])).is_some());

        cache.invalidate(&QueryKey::new(["blog-posts"]));
        assert!(cache.is_empty());
    }
}
