//! In-memory key-value store.
//!
//! `BTreeMap`-backed implementation of `KvStore`. Nothing survives the
//! process; the ordered map gives the same ascending-key iteration as the
//! durable backend, so repository behavior is identical. Used by unit tests
//! and as an ephemeral backend.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use memoria_types::error::StoreError;

use super::kv_store::KvStore;

/// Non-durable `KvStore` over a shared ordered map.
///
/// Clones share the same underlying map.
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<BTreeMap<String, serde_json::Value>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the map, recovering from poisoning: no operation here can leave
    /// the tree in a partial state.
    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, serde_json::Value>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        self.entries().insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries().remove(key);
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, serde_json::Value)>, StoreError> {
        Ok(self
            .entries()
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}
