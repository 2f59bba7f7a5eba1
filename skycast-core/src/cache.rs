//! Key/value cache with per-entry TTL.
//!
//! [`CacheStore`] is the storage seam (in-process map, JSON file, or anything
//! shared between processes). [`Cache`] wraps a store and adds the typed
//! fetch-or-populate contract the service relies on.
//!
//! There is no single-flight guarantee: two concurrent misses on the same key
//! may both run their producer, and the last write wins.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{fmt::Debug, future::Future, sync::Arc, time::Duration};

use crate::WeatherError;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Raw storage of serialised values. Expired entries must behave as absent.
#[async_trait]
pub trait CacheStore: Send + Sync + Debug {
    async fn read(&self, key: &str) -> Result<Option<Value>, WeatherError>;

    async fn write(&self, key: &str, value: Value, ttl: Duration) -> Result<(), WeatherError>;

    async fn exists(&self, key: &str) -> Result<bool, WeatherError>;

    /// Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, WeatherError>;

    async fn clear(&self) -> Result<(), WeatherError>;
}

/// Shared, cheaply clonable handle over a [`CacheStore`].
#[derive(Debug, Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// A fresh process-local cache.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Return the cached value under `key`, or run `producer`, store its
    /// result for `ttl` and return that. The flag is `true` on a hit.
    ///
    /// Producer errors are returned as-is and nothing is stored.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<(T, bool), WeatherError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, WeatherError>>,
    {
        if let Some(value) = self.read::<T>(key).await? {
            tracing::debug!(key, "cache hit");
            return Ok((value, true));
        }

        tracing::debug!(key, "cache miss");
        let value = producer().await?;
        self.write(key, &value, ttl).await?;
        Ok((value, false))
    }

    /// Non-mutating hit check.
    pub async fn exists(&self, key: &str) -> Result<bool, WeatherError> {
        self.store.exists(key).await
    }

    /// Typed read. An entry that no longer decodes as `T` counts as a miss.
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, WeatherError> {
        let Some(raw) = self.store.read(key).await? else {
            return Ok(None);
        };

        match serde_json::from_value(raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key, error = %err, "discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    pub async fn write<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), WeatherError> {
        let raw = serde_json::to_value(value)
            .map_err(|e| WeatherError::Cache(format!("failed to serialize '{key}': {e}")))?;
        self.store.write(key, raw, ttl).await
    }

    pub async fn delete(&self, key: &str) -> Result<bool, WeatherError> {
        self.store.delete(key).await
    }

    pub async fn clear(&self) -> Result<(), WeatherError> {
        self.store.clear().await
    }
}
