use async_trait::async_trait;
use serde_json::Value;
use std::{collections::HashMap, time::Duration};
use tokio::{sync::Mutex, time::Instant};

use super::CacheStore;
use crate::WeatherError;

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-local store. Expiry uses tokio's clock so tests can pause time.
///
/// Every `write` prunes expired entries first, so the map stays bounded by the
/// set of keys written within one TTL. `purge_expired` does the same on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().await.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<Value>, WeatherError> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        Ok(entries.get(key).filter(|e| e.is_live(now)).map(|e| e.value.clone()))
    }

    async fn write(&self, key: &str, value: Value, ttl: Duration) -> Result<(), WeatherError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(key.to_string(), Entry { value, expires_at: now + ttl });
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, WeatherError> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        Ok(entries.get(key).is_some_and(|e| e.is_live(now)))
    }

    async fn delete(&self, key: &str) -> Result<bool, WeatherError> {
        let now = Instant::now();
        let removed = self.entries.lock().await.remove(key);
        Ok(removed.is_some_and(|e| e.is_live(now)))
    }

    async fn clear(&self) -> Result<(), WeatherError> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let store = MemoryStore::new();
        store
            .write("weather:1:2", json!({"t": 1}), Duration::from_secs(30 * 60))
            .await
            .expect("write");

        tokio::time::advance(Duration::from_secs(29 * 60)).await;
        assert!(store.exists("weather:1:2").await.expect("exists"));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(!store.exists("weather:1:2").await.expect("exists"));
        assert_eq!(store.read("weather:1:2").await.expect("read"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_removes_only_expired() {
        let store = MemoryStore::new();
        store.write("short", json!(1), Duration::from_secs(10)).await.expect("write");
        store.write("long", json!(2), Duration::from_secs(100)).await.expect("write");

        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(!store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn write_prunes_expired_entries() {
        let store = MemoryStore::new();
        store.write("short", json!(1), Duration::from_secs(10)).await.expect("write");

        tokio::time::advance(Duration::from_secs(11)).await;
        store.write("long", json!(2), Duration::from_secs(100)).await.expect("write");

        assert_eq!(store.entries.lock().await.len(), 1);
        assert_eq!(store.purge_expired().await, 0);
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(10);
        store.write("k", json!("old"), ttl).await.expect("write");
        store.write("k", json!("new"), ttl).await.expect("write");

        assert_eq!(store.read("k").await.expect("read"), Some(json!("new")));
    }
}
