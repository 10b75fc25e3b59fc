//! Entity services
//!
//! Read-through queries and write-then-invalidate mutations for each remote
//! entity kind.

pub mod pages;
pub mod posts;
pub mod prescriptions;

// Re-exports
pub use pages::CmsPages;
pub use posts::BlogPosts;
pub use prescriptions::Prescriptions;

use crate::cache::{QueryCache, QueryKey};
use crate::error::{AppError, Result};
use crate::notify::{Notice, Notifier};
use crate::remote::TableSource;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Every entity service over one backend and one cache
pub struct Services {
    pub prescriptions: Prescriptions,
    pub pages: CmsPages,
    pub posts: BlogPosts,
}

impl Services {
    /// Build the services sharing `source` and `cache`
    pub fn new(source: Arc<dyn TableSource>, cache: Arc<dyn QueryCache>) -> Self {
        let backend = Backend::new(source, cache);
        Self {
            prescriptions: Prescriptions::new(backend.clone()),
            pages: CmsPages::new(backend.clone()),
            posts: BlogPosts::new(backend),
        }
    }
}

/// Source and cache shared by the services
#[derive(Clone)]
pub struct Backend {
    source: Arc<dyn TableSource>,
    cache: Arc<dyn QueryCache>,
}

impl Backend {
    pub fn new(source: Arc<dyn TableSource>, cache: Arc<dyn QueryCache>) -> Self {
        Self { source, cache }
    }

    pub(crate) fn source(&self) -> &dyn TableSource {
        self.source.as_ref()
    }

    /// Serve `key` from the cache, or run `fetch` and cache its result
    ///
    /// Only values that validate as `T` are cached; errors never are.
    pub(crate) fn cached<T, F>(&self, key: QueryKey, table: &str, fetch: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&dyn TableSource) -> Result<Value>,
    {
        if let Some(value) = self.cache.get(&key) {
            match decode(table, value) {
                Ok(hit) => {
                    debug!(%key, "cache hit");
                    return Ok(hit);
                }
                Err(e) => {
                    warn!(%key, error = %e, "dropping undecodable cache entry");
                    self.cache.invalidate(&key);
                }
            }
        }

        let value = fetch(self.source())?;
        let decoded = decode(table, value.clone())?;
        self.cache.put(key, value);
        Ok(decoded)
    }

    /// Run a write, then invalidate `keys` and notify
    ///
    /// Nothing is invalidated or announced when `write` fails.
    pub(crate) fn mutate<T, F>(
        &self,
        table: &str,
        write: F,
        keys: &[QueryKey],
        notifier: Option<&dyn Notifier>,
        notice: Notice,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&dyn TableSource) -> Result<Value>,
    {
        let stored = write(self.source())?;

        // The row is written at this point, so cached reads are stale either way
        for key in keys {
            self.cache.invalidate(key);
        }

        let record = decode(table, stored)?;
        if let Some(notifier) = notifier {
            notifier.notify(notice);
        }
        Ok(record)
    }
}

/// Validate a backend value into a record type
pub(crate) fn decode<T: DeserializeOwned>(table: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| AppError::InvalidRow {
        table: table.to_string(),
        reason: e.to_string(),
    })
}

/// Encode an insert payload
pub(crate) fn encode<T: Serialize>(table: &str, payload: &T) -> Result<Value> {
    serde_json::to_value(payload).map_err(|e| AppError::InvalidRow {
        table: table.to_string(),
        reason: e.to_string(),
    })
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::remote::Query;
    use serde_json::json;

    #[test]
    fn test_cached_reads_through_once() {
        let (source, _cache, backend) = harness();
        source.inner.seed("t", vec![json!({"n": 1})]);

        let key = QueryKey::new(["t"]);
        for _ in 0..3 {
            let rows: Vec<Value> = backend
                .cached(key.clone(), "t", |s| s.select(&Query::table("t")).map(Value::Array))
                .unwrap();
            assert_eq!(rows.len(), 1);
        }
        assert_eq!(source.calls().len(), 1);
    }

    #[test]
    fn test_cached_does_not_store_errors() {
        let (source, cache, backend) = harness();
        source.fail_when("t");

        let key = QueryKey::new(["t"]);
        let result: Result<Vec<Value>> =
            backend.cached(key.clone(), "t", |s| s.select(&Query::table("t")).map(Value::Array));
        assert!(result.is_err());
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_cached_does_not_store_invalid_rows() {
        let (source, cache, backend) = harness();
        source.inner.seed("t", vec![json!({"n": "not a number"})]);

        #[derive(Debug, serde::Deserialize)]
        struct Row {
            #[allow(dead_code)]
            n: u32,
        }

        let key = QueryKey::new(["t"]);
        let result: Result<Vec<Row>> =
            backend.cached(key.clone(), "t", |s| s.select(&Query::table("t")).map(Value::Array));
        assert!(matches!(result, Err(AppError::InvalidRow { .. })));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_services_share_backend() {
        let source = Arc::new(RecordingSource::new());
        let cache = Arc::new(RecordingCache::default());
        let services = Services::new(source.clone(), cache);

        services.pages.list().unwrap();
        services.posts.published_list().unwrap();
        services.prescriptions.list().unwrap();
        assert_eq!(source.calls().len(), 3);
    }
}
