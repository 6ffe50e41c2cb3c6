//! In-memory key-value store.
//!
//! Doubles as the test store and the degraded-mode fallback when no durable
//! storage is available: the session keeps working, it just forgets on exit.

use dashmap::DashMap;

use chimera_types::error::StorageError;

use super::kv_store::KvStore;

/// DashMap-backed `KvStore`. Cheap to clone-free share behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, serde_json::Value>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryKvStore {
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn save(&self, key: &str, value: &serde_json::Value) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
