use crate::error::CacheError;
use crate::store::CacheStore;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Payloads that can round-trip through the cache.
///
/// `worth_caching` lets a type veto storage of empty results (an empty
/// retrieval response or a degraded empty embedding must not shadow a later
/// successful computation for the full TTL window).
pub trait Cacheable: Serialize + DeserializeOwned {
    /// Whether this value should be written to the cache at all.
    fn worth_caching(&self) -> bool {
        true
    }

    /// Hook invoked when the value was served from the cache rather than
    /// recomputed. Types carrying observability metadata override this.
    fn mark_cache_hit(&mut self) {}
}

impl Cacheable for Vec<f32> {
    fn worth_caching(&self) -> bool {
        !self.is_empty()
    }
}

/// Namespaced, serde-typed TTL cache over an optional [`CacheStore`].
///
/// Every operation is best-effort: a missing store, a store error, or a
/// malformed payload degrades to a miss (reads) or a no-op (writes), logged
/// at warn level and never propagated to callers.
#[derive(Clone)]
pub struct TtlCache {
    store: Option<Arc<dyn CacheStore>>,
    namespace: String,
}

impl TtlCache {
    /// Cache backed by a shared store.
    pub fn new(store: Arc<dyn CacheStore>, namespace: impl Into<String>) -> Self {
        Self {
            store: Some(store),
            namespace: namespace.into(),
        }
    }

    /// Cache with no backing store; every read misses, every write is a no-op.
    pub fn disabled(namespace: impl Into<String>) -> Self {
        Self {
            store: None,
            namespace: namespace.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{key}", self.namespace)
    }

    /// Typed read; any failure degrades to `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store = self.store.as_ref()?;
        let raw = match store.get(&self.full_key(key)).await {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("cache read degraded to miss for '{key}': {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("discarding malformed cache payload for '{key}': {err}");
                None
            }
        }
    }

    /// Bulk typed read; the output always has one slot per input key.
    pub async fn get_many<T: DeserializeOwned>(&self, keys: &[String]) -> Vec<Option<T>> {
        let Some(store) = self.store.as_ref() else {
            return keys.iter().map(|_| None).collect();
        };
        let full_keys: Vec<String> = keys.iter().map(|k| self.full_key(k)).collect();
        match store.get_many(&full_keys).await {
            Ok(raw_values) => raw_values
                .into_iter()
                .map(|raw| raw.and_then(|r| serde_json::from_str(&r).ok()))
                .collect(),
            Err(err) => {
                warn!("bulk cache read degraded to {} misses: {err}", keys.len());
                keys.iter().map(|_| None).collect()
            }
        }
    }

    /// Best-effort typed write; failures are logged and swallowed.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("skipping cache write for '{key}': {err}");
                return;
            }
        };
        if let Err(err) = store.set(&self.full_key(key), &raw, ttl).await {
            warn!("cache write failed for '{key}': {err}");
        }
    }

    /// Best-effort delete.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self.store.as_ref() {
            Some(store) => store.delete(&self.full_key(key)).await,
            None => Ok(()),
        }
    }

    /// Return the cached value for `key`, or run `compute`, store its result,
    /// and return it.
    ///
    /// Empty payloads (per [`Cacheable::worth_caching`]) are returned but not
    /// stored. Errors from `compute` pass through untouched and nothing is
    /// cached for them. Concurrent callers missing the same key may each run
    /// `compute`; writes are idempotent so the duplication is benign.
    pub async fn wrap<T, E, F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> Result<T, E>
    where
        T: Cacheable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(mut cached) = self.get::<T>(key).await {
            cached.mark_cache_hit();
            return Ok(cached);
        }
        let value = compute().await?;
        if value.worth_caching() {
            self.set(key, &value, ttl).await;
        }
        Ok(value)
    }
}
