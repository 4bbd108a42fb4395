//! In-memory storage engine.

use crate::engine::{retain_present, StorageEngine};
use crate::key::StorageKey;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::SystemTime;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct MemoryEntry {
    data: Vec<u8>,
    created_at: SystemTime,
    updated_at: SystemTime,
}

/// Engine keeping every entry in a `HashMap`.
///
/// All operations go through one lock, so batch writes and removals are
/// applied as a single step. Data is lost when the engine is dropped.
pub struct MemoryEngine<K: StorageKey> {
    entries: Mutex<HashMap<K, MemoryEntry>>,
}

impl<K: StorageKey> MemoryEngine<K> {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn upsert(entries: &mut HashMap<K, MemoryEntry>, key: K, data: Vec<u8>, now: SystemTime) {
        match entries.get_mut(&key) {
            Some(entry) => {
                entry.data = data;
                entry.updated_at = now;
            }
            None => {
                entries.insert(
                    key,
                    MemoryEntry {
                        data,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
    }
}

impl<K: StorageKey> Default for MemoryEngine<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: StorageKey> StorageEngine for MemoryEngine<K> {
    type Key = K;

    async fn write(&self, data: Vec<u8>, key: &K) -> Result<()> {
        let mut entries = self.entries.lock().await;
        Self::upsert(&mut entries, key.clone(), data, SystemTime::now());
        tracing::debug!(key = ?key, "memory write");
        Ok(())
    }

    async fn write_many(&self, pairs: Vec<(K, Vec<u8>)>) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let now = SystemTime::now();
        let count = pairs.len();
        for (key, data) in pairs {
            Self::upsert(&mut entries, key, data, now);
        }
        tracing::debug!(count, "memory batch write");
        Ok(())
    }

    async fn read(&self, key: &K) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).map(|entry| entry.data.clone()))
    }

    async fn read_many(&self, keys: &[K]) -> Result<Vec<(K, Vec<u8>)>> {
        let entries = self.entries.lock().await;
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(key).map(|entry| (key.clone(), entry.data.clone())))
            .collect())
    }

    async fn read_all_keys_and_values(&self) -> Result<Vec<(K, Vec<u8>)>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.data.clone()))
            .collect())
    }

    async fn remove(&self, key: &K) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn remove_many(&self, keys: &[K]) -> Result<()> {
        let mut entries = self.entries.lock().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn remove_all(&self) -> Result<()> {
        self.entries.lock().await.clear();
        Ok(())
    }

    async fn key_exists(&self, key: &K) -> Result<bool> {
        Ok(self.entries.lock().await.contains_key(key))
    }

    async fn keys_exist(&self, keys: &[K]) -> Result<Vec<K>> {
        let entries = self.entries.lock().await;
        Ok(retain_present(keys, |key| entries.contains_key(key)))
    }

    async fn key_count(&self) -> Result<usize> {
        Ok(self.entries.lock().await.len())
    }

    async fn all_keys(&self) -> Result<Vec<K>> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }

    async fn created_at(&self, key: &K) -> Result<Option<SystemTime>> {
        Ok(self.entries.lock().await.get(key).map(|entry| entry.created_at))
    }

    async fn updated_at(&self, key: &K) -> Result<Option<SystemTime>> {
        Ok(self.entries.lock().await.get(key).map(|entry| entry.updated_at))
    }
}
