//! Cache store contract and in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::entry::CachedEntry;
use crate::key::CacheKey;

/// Result type for cache store operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache store errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to serialize or deserialize an entry.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Key/value byte store holding cached entries.
///
/// Lookups run on the hot path. Writes are best-effort side effects: the
/// orchestrator detaches them from the response path and a failure must
/// never surface to the client.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the entry stored under `key`, if any.
    async fn lookup(&self, key: &CacheKey) -> CacheResult<Option<CachedEntry>>;

    /// Store `entry` under `key`, replacing any previous entry.
    async fn store(&self, key: &CacheKey, entry: CachedEntry) -> CacheResult<()>;
}

/// In-memory cache store for development and tests.
///
/// Entries are kept serialized, matching the byte-store contract of the
/// real edge cache. No eviction: TTL/LRU behavior belongs to the backing
/// store, not this layer.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a key currently has an entry.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().await.contains_key(key.as_str())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn lookup(&self, key: &CacheKey) -> CacheResult<Option<CachedEntry>> {
        let entries = self.entries.read().await;
        match entries.get(key.as_str()) {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            None => Ok(None),
        }
    }

    async fn store(&self, key: &CacheKey, entry: CachedEntry) -> CacheResult<()> {
        let bytes = serde_json::to_vec(&entry)?;
        self.entries.write().await.insert(key.as_str().to_string(), bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn entry(body: &[u8]) -> CachedEntry {
        let mut headers = BTreeMap::new();
        headers.insert("etag".to_string(), "\"tag\"".to_string());
        CachedEntry {
            body: body.to_vec(),
            headers,
        }
    }

    #[tokio::test]
    async fn test_lookup_miss_returns_none() {
        let store = MemoryStore::new();
        let key = CacheKey::for_request("/api/v1/pride-data", "v1");
        assert!(store.lookup(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_then_lookup_round_trips() {
        let store = MemoryStore::new();
        let key = CacheKey::for_request("/api/v1/pride-data", "v1");
        store.store(&key, entry(b"payload")).await.unwrap();

        let found = store.lookup(&key).await.unwrap().unwrap();
        assert_eq!(found.body, b"payload");
        assert_eq!(found.etag(), Some("\"tag\""));
    }

    #[tokio::test]
    async fn test_store_replaces_previous_entry() {
        let store = MemoryStore::new();
        let key = CacheKey::for_request("/api/v1/pride-data", "v1");
        store.store(&key, entry(b"old")).await.unwrap();
        store.store(&key, entry(b"new")).await.unwrap();

        let found = store.lookup(&key).await.unwrap().unwrap();
        assert_eq!(found.body, b"new");
    }
}
