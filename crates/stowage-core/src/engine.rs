//! The storage engine contract.
//!
//! A backend implements the single-item primitives (`write`, `read`,
//! `remove`, `all_keys`, `created_at`, `updated_at`). Every multi-item
//! operation has a default derived from those primitives, so a new backend
//! is correct as soon as the primitives are. Backends override the batch
//! operations only to make them cheaper; observable results must match the
//! defaults.
//!
//! Batch defaults loop over the primitives in the given order and stop at
//! the first failure. Items processed before the failure stay committed.

use crate::key::StorageKey;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::SystemTime;

/// Uniform async key-value interface implemented by every backend.
///
/// Operations on one engine instance are serialized by the instance itself;
/// two instances never synchronize with each other.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// The key type this engine addresses entries by.
    type Key: StorageKey;

    /// Inserts or replaces the value stored under `key`.
    async fn write(&self, data: Vec<u8>, key: &Self::Key) -> Result<()>;

    /// Inserts or replaces many entries, in the given order.
    ///
    /// No atomicity across the batch unless an engine documents otherwise.
    async fn write_many(&self, pairs: Vec<(Self::Key, Vec<u8>)>) -> Result<()> {
        for (key, data) in pairs {
            self.write(data, &key).await?;
        }
        Ok(())
    }

    /// Reads the value stored under `key`, `None` if there is none.
    async fn read(&self, key: &Self::Key) -> Result<Option<Vec<u8>>>;

    /// Reads each key, omitting keys that have no stored value.
    async fn read_many(&self, keys: &[Self::Key]) -> Result<Vec<(Self::Key, Vec<u8>)>> {
        let mut pairs = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(data) = self.read(key).await? {
                pairs.push((key.clone(), data));
            }
        }
        Ok(pairs)
    }

    /// Reads every stored value, in [`StorageEngine::all_keys`] order.
    async fn read_all_values(&self) -> Result<Vec<Vec<u8>>> {
        let pairs = self.read_all_keys_and_values().await?;
        Ok(pairs.into_iter().map(|(_, data)| data).collect())
    }

    /// Reads every stored entry, in [`StorageEngine::all_keys`] order.
    async fn read_all_keys_and_values(&self) -> Result<Vec<(Self::Key, Vec<u8>)>> {
        let keys = self.all_keys().await?;
        self.read_many(&keys).await
    }

    /// Removes the entry under `key`. Removing an absent key is a no-op.
    async fn remove(&self, key: &Self::Key) -> Result<()>;

    /// Removes each key in order.
    async fn remove_many(&self, keys: &[Self::Key]) -> Result<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }

    /// Removes every entry.
    async fn remove_all(&self) -> Result<()> {
        let keys = self.all_keys().await?;
        self.remove_many(&keys).await
    }

    /// Whether a value is stored under `key`.
    async fn key_exists(&self, key: &Self::Key) -> Result<bool> {
        Ok(self.all_keys().await?.contains(key))
    }

    /// The subset of `keys` that have a stored value, in input order and
    /// without duplicates. Enumerates the key set once.
    async fn keys_exist(&self, keys: &[Self::Key]) -> Result<Vec<Self::Key>> {
        let stored: HashSet<Self::Key> = self.all_keys().await?.into_iter().collect();
        Ok(retain_present(keys, |key| stored.contains(key)))
    }

    /// Number of stored entries.
    async fn key_count(&self) -> Result<usize> {
        Ok(self.all_keys().await?.len())
    }

    /// Every stored key. Order is backend-defined.
    async fn all_keys(&self) -> Result<Vec<Self::Key>>;

    /// When the entry under `key` was first written.
    async fn created_at(&self, key: &Self::Key) -> Result<Option<SystemTime>>;

    /// When the entry under `key` was last written.
    async fn updated_at(&self, key: &Self::Key) -> Result<Option<SystemTime>>;
}

/// Filters `keys` down to those accepted by `present`, keeping input order
/// and dropping repeats.
pub fn retain_present<K, F>(keys: &[K], mut present: F) -> Vec<K>
where
    K: StorageKey,
    F: FnMut(&K) -> bool,
{
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter()
        .filter(|key| present(key) && seen.insert((*key).clone()))
        .cloned()
        .collect()
}
