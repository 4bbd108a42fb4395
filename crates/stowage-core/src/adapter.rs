//! Key-erasing adapter.
//!
//! [`KeyErasingEngine`] presents an inner engine under a different key type,
//! as long as both key types wrap the same raw scalar kind. Keys are
//! translated on the way in and on the way back out.
//!
//! A key read back from the inner engine that the outer key type rejects is
//! an error, never a silently dropped entry.

use crate::engine::StorageEngine;
use crate::key::StorageKey;
use crate::{Error, Result};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::time::SystemTime;

/// Wraps an engine keyed by `E::Key` so it can be addressed with `K`.
///
/// # Examples
///
/// ```rust
/// use stowage_core::{CacheKey, Identifier, KeyErasingEngine, MemoryEngine, StorageEngine};
///
/// # tokio_test_block_on(async {
/// let inner: MemoryEngine<CacheKey> = MemoryEngine::new();
/// let engine: KeyErasingEngine<Identifier, _> = KeyErasingEngine::new(inner);
///
/// let key = Identifier::new("settings")?;
/// engine.write(b"dark".to_vec(), &key).await?;
/// assert_eq!(engine.inner().read(&CacheKey::new("settings")).await?, Some(b"dark".to_vec()));
/// # Ok::<(), stowage_core::Error>(())
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct KeyErasingEngine<K, E> {
    inner: E,
    _key: PhantomData<fn() -> K>,
}

impl<K, E> KeyErasingEngine<K, E>
where
    E: StorageEngine,
    K: StorageKey<Raw = <E::Key as StorageKey>::Raw>,
{
    /// Wraps `inner`.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            _key: PhantomData,
        }
    }

    /// The wrapped engine.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Unwraps the inner engine.
    pub fn into_inner(self) -> E {
        self.inner
    }

    fn to_inner(key: &K) -> Result<E::Key> {
        <E::Key as StorageKey>::convert(key)
            .map_err(|e| Error::KeyTranslation(format!("{:?} has no inner form: {}", key, e)))
    }

    fn to_outer(key: &E::Key) -> Result<K> {
        K::convert(key)
            .map_err(|e| Error::KeyTranslation(format!("{:?} has no outer form: {}", key, e)))
    }

    fn keys_to_inner(keys: &[K]) -> Result<Vec<E::Key>> {
        keys.iter().map(Self::to_inner).collect()
    }

    fn keys_to_outer(keys: Vec<E::Key>) -> Result<Vec<K>> {
        keys.iter().map(Self::to_outer).collect()
    }

    fn pairs_to_outer(pairs: Vec<(E::Key, Vec<u8>)>) -> Result<Vec<(K, Vec<u8>)>> {
        pairs
            .into_iter()
            .map(|(key, data)| Ok((Self::to_outer(&key)?, data)))
            .collect()
    }
}

#[async_trait]
impl<K, E> StorageEngine for KeyErasingEngine<K, E>
where
    E: StorageEngine,
    K: StorageKey<Raw = <E::Key as StorageKey>::Raw>,
{
    type Key = K;

    async fn write(&self, data: Vec<u8>, key: &K) -> Result<()> {
        let key = Self::to_inner(key)?;
        self.inner.write(data, &key).await
    }

    async fn write_many(&self, pairs: Vec<(K, Vec<u8>)>) -> Result<()> {
        let pairs = pairs
            .into_iter()
            .map(|(key, data)| Ok((Self::to_inner(&key)?, data)))
            .collect::<Result<Vec<_>>>()?;
        self.inner.write_many(pairs).await
    }

    async fn read(&self, key: &K) -> Result<Option<Vec<u8>>> {
        let key = Self::to_inner(key)?;
        self.inner.read(&key).await
    }

    async fn read_many(&self, keys: &[K]) -> Result<Vec<(K, Vec<u8>)>> {
        let keys = Self::keys_to_inner(keys)?;
        Self::pairs_to_outer(self.inner.read_many(&keys).await?)
    }

    async fn read_all_values(&self) -> Result<Vec<Vec<u8>>> {
        self.inner.read_all_values().await
    }

    async fn read_all_keys_and_values(&self) -> Result<Vec<(K, Vec<u8>)>> {
        Self::pairs_to_outer(self.inner.read_all_keys_and_values().await?)
    }

    async fn remove(&self, key: &K) -> Result<()> {
        let key = Self::to_inner(key)?;
        self.inner.remove(&key).await
    }

    async fn remove_many(&self, keys: &[K]) -> Result<()> {
        let keys = Self::keys_to_inner(keys)?;
        self.inner.remove_many(&keys).await
    }

    async fn remove_all(&self) -> Result<()> {
        self.inner.remove_all().await
    }

    async fn key_exists(&self, key: &K) -> Result<bool> {
        let key = Self::to_inner(key)?;
        self.inner.key_exists(&key).await
    }

    async fn keys_exist(&self, keys: &[K]) -> Result<Vec<K>> {
        let keys = Self::keys_to_inner(keys)?;
        Self::keys_to_outer(self.inner.keys_exist(&keys).await?)
    }

    async fn key_count(&self) -> Result<usize> {
        self.inner.key_count().await
    }

    async fn all_keys(&self) -> Result<Vec<K>> {
        Self::keys_to_outer(self.inner.all_keys().await?)
    }

    async fn created_at(&self, key: &K) -> Result<Option<SystemTime>> {
        let key = Self::to_inner(key)?;
        self.inner.created_at(&key).await
    }

    async fn updated_at(&self, key: &K) -> Result<Option<SystemTime>> {
        let key = Self::to_inner(key)?;
        self.inner.updated_at(&key).await
    }
}
