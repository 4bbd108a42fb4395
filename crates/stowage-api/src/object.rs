//! Typed object storage on top of any engine.
//!
//! Engines move opaque bytes. [`ObjectStorage`] pairs an engine with a
//! [`Codec`] so callers can store and load their own types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::time::SystemTime;
use stowage_core::{Error, Result, StorageEngine};

/// Converts objects to and from stored bytes.
pub trait Codec<T>: Send + Sync {
    /// Encode an object for storage
    fn encode(&self, object: &T) -> Result<Vec<u8>>;

    /// Decode stored bytes
    fn decode(&self, bytes: &[u8]) -> Result<T>;
}

/// Default codec: `bincode` over serde.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl<T: Serialize + DeserializeOwned> Codec<T> for BincodeCodec {
    fn encode(&self, object: &T) -> Result<Vec<u8>> {
        bincode::serialize(object).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Stores objects of type `T` in an engine through a codec.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use stowage::{CacheKey, MemoryEngine, ObjectStorage};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let users = ObjectStorage::new(MemoryEngine::new());
/// let key = CacheKey::new("user:1");
///
/// users.store(&User { name: "Alice".into() }, &key).await?;
/// assert_eq!(users.object(&key).await?, Some(User { name: "Alice".into() }));
/// # Ok::<(), stowage::Error>(())
/// # }).unwrap();
/// ```
pub struct ObjectStorage<T, E, C = BincodeCodec> {
    engine: E,
    codec: C,
    _object: PhantomData<fn() -> T>,
}

impl<T, E> ObjectStorage<T, E, BincodeCodec>
where
    T: Serialize + DeserializeOwned,
    E: StorageEngine,
{
    /// Object storage using [`BincodeCodec`].
    pub fn new(engine: E) -> Self {
        Self::with_codec(engine, BincodeCodec)
    }
}

impl<T, E, C> ObjectStorage<T, E, C>
where
    E: StorageEngine,
    C: Codec<T>,
{
    /// Object storage using a custom codec.
    pub fn with_codec(engine: E, codec: C) -> Self {
        Self {
            engine,
            codec,
            _object: PhantomData,
        }
    }

    /// The underlying engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Unwraps the underlying engine
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Store one object.
    pub async fn store(&self, object: &T, key: &E::Key) -> Result<()> {
        let data = self.codec.encode(object)?;
        self.engine.write(data, key).await
    }

    /// Store many objects with one engine batch write. Nothing is written
    /// if any object fails to encode.
    pub async fn store_many(&self, objects: &[(E::Key, T)]) -> Result<()> {
        let pairs = objects
            .iter()
            .map(|(key, object)| Ok((key.clone(), self.codec.encode(object)?)))
            .collect::<Result<Vec<_>>>()?;
        self.engine.write_many(pairs).await
    }

    /// Load one object.
    pub async fn object(&self, key: &E::Key) -> Result<Option<T>> {
        match self.engine.read(key).await? {
            Some(data) => Ok(Some(self.codec.decode(&data)?)),
            None => Ok(None),
        }
    }

    /// Load the objects stored under `keys`, skipping keys with no value.
    pub async fn objects(&self, keys: &[E::Key]) -> Result<Vec<T>> {
        let pairs = self.engine.read_many(keys).await?;
        pairs
            .iter()
            .map(|(_, data)| self.codec.decode(data))
            .collect()
    }

    /// Load every stored object.
    pub async fn all_objects(&self) -> Result<Vec<T>> {
        let values = self.engine.read_all_values().await?;
        values.iter().map(|data| self.codec.decode(data)).collect()
    }

    /// Load every stored object with its key.
    pub async fn all_keys_and_objects(&self) -> Result<Vec<(E::Key, T)>> {
        let pairs = self.engine.read_all_keys_and_values().await?;
        pairs
            .into_iter()
            .map(|(key, data)| Ok((key, self.codec.decode(&data)?)))
            .collect()
    }

    /// Remove one object.
    pub async fn remove_object(&self, key: &E::Key) -> Result<()> {
        self.engine.remove(key).await
    }

    /// Remove the objects stored under `keys`.
    pub async fn remove_objects(&self, keys: &[E::Key]) -> Result<()> {
        self.engine.remove_many(keys).await
    }

    /// Remove every object.
    pub async fn remove_all_objects(&self) -> Result<()> {
        self.engine.remove_all().await
    }

    /// Every key with a stored object.
    pub async fn keys(&self) -> Result<Vec<E::Key>> {
        self.engine.all_keys().await
    }

    /// Number of stored objects.
    pub async fn key_count(&self) -> Result<usize> {
        self.engine.key_count().await
    }

    /// Whether an object is stored under `key`.
    pub async fn key_exists(&self, key: &E::Key) -> Result<bool> {
        self.engine.key_exists(key).await
    }

    /// When the object under `key` was first stored.
    pub async fn created_at(&self, key: &E::Key) -> Result<Option<SystemTime>> {
        self.engine.created_at(key).await
    }

    /// When the object under `key` was last stored.
    pub async fn updated_at(&self, key: &E::Key) -> Result<Option<SystemTime>> {
        self.engine.updated_at(key).await
    }
}
