//! JSON-file store, so a short-lived CLI process still benefits from the cache.
//!
//! Expiry uses wall-clock milliseconds. The file is read on first access, not
//! on open. A missing or corrupt file is treated as an empty cache; the file is
//! rewritten after every mutation.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

use super::CacheStore;
use crate::WeatherError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileEntry {
    value: Value,
    expires_at_ms: i64,
}

impl FileEntry {
    fn is_live(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }
}

type Entries = HashMap<String, FileEntry>;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// `None` until the file has been loaded.
    entries: Mutex<Option<Entries>>,
}

impl FileStore {
    /// Point at the cache file at `path`. Does no IO.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), entries: Mutex::new(None) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn entries(&self) -> MappedMutexGuard<'_, Entries> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(Self::read_file(&self.path).await.unwrap_or_default());
        }
        MutexGuard::map(guard, |entries| entries.get_or_insert_with(HashMap::new))
    }

    async fn read_file(path: &Path) -> Option<Entries> {
        let data = tokio::fs::read_to_string(path).await.ok()?;
        match serde_json::from_str(&data) {
            Ok(entries) => Some(entries),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring corrupt cache file");
                None
            }
        }
    }

    async fn persist(&self, entries: &Entries) -> Result<(), WeatherError> {
        let now_ms = Utc::now().timestamp_millis();
        let live: HashMap<&String, &FileEntry> =
            entries.iter().filter(|(_, e)| e.is_live(now_ms)).collect();

        let json = serde_json::to_string(&live)
            .map_err(|e| WeatherError::Cache(format!("failed to serialize cache file: {e}")))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                WeatherError::Cache(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| WeatherError::Cache(format!("failed to write {}: {e}", self.path.display())))
    }
}

fn expiry_ms(ttl: Duration) -> i64 {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    Utc::now().timestamp_millis().saturating_add(ttl_ms)
}

#[async_trait]
impl CacheStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<Value>, WeatherError> {
        let now_ms = Utc::now().timestamp_millis();
        let entries = self.entries().await;
        Ok(entries.get(key).filter(|e| e.is_live(now_ms)).map(|e| e.value.clone()))
    }

    async fn write(&self, key: &str, value: Value, ttl: Duration) -> Result<(), WeatherError> {
        let mut entries = self.entries().await;
        entries.insert(key.to_string(), FileEntry { value, expires_at_ms: expiry_ms(ttl) });
        self.persist(&entries).await
    }

    async fn exists(&self, key: &str) -> Result<bool, WeatherError> {
        let now_ms = Utc::now().timestamp_millis();
        let entries = self.entries().await;
        Ok(entries.get(key).is_some_and(|e| e.is_live(now_ms)))
    }

    async fn delete(&self, key: &str) -> Result<bool, WeatherError> {
        let now_ms = Utc::now().timestamp_millis();
        let mut entries = self.entries().await;
        let removed = entries.remove(key);
        self.persist(&entries).await?;
        Ok(removed.is_some_and(|e| e.is_live(now_ms)))
    }

    async fn clear(&self) -> Result<(), WeatherError> {
        let mut entries = self.entries().await;
        entries.clear();
        self.persist(&entries).await
    }
}
