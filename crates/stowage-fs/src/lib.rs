//! # Stowage Filesystem Engine
//!
//! Persists each entry as one file in a root directory.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of Stowage.**
//!
//! Users should depend on the main [`stowage`](https://crates.io/crates/stowage) crate
//! instead, which provides the stable public API.
//!
//! ---
//!
//! ## Layout
//!
//! ```text
//! <root>/
//!   aGVsbG8~          one regular file per key, named by filename::sanitize
//!   dXNlci80Mg~~      file contents are the stored bytes
//! ```
//!
//! Writes go to a hidden temporary file that is renamed over the target, so
//! a reader sees either the old or the new contents. Entry timestamps are
//! the file's own filesystem timestamps.
//!
//! The root directory is treated as owned by the engine. Files whose names
//! are not key encodings are ignored when listing keys.

use async_trait::async_trait;
use std::ffi::OsStr;
use std::fs::Metadata;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use stowage_core::{Error, RawKey, Result, StorageEngine, StorageKey};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub mod filename;

pub use filename::{desanitize, sanitize};

/// Default root directory used by [`FileSystemConfig::default`]
pub const DEFAULT_ROOT: &str = "stowage";

/// Durability of individual writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// fsync the new contents before they replace the old file
    Sync,
    /// Leave flushing to the OS (faster, unsafe for power loss)
    None,
}

/// Filesystem engine configuration
#[derive(Debug, Clone)]
pub struct FileSystemConfig {
    /// Directory holding one file per key
    pub root: PathBuf,
    /// Sync mode for writes
    pub sync_mode: SyncMode,
}

impl Default for FileSystemConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            sync_mode: SyncMode::Sync,
        }
    }
}

impl FileSystemConfig {
    /// Config rooted at `root` with default settings
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Set the sync mode
    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }
}

/// Storage engine keeping one file per key under a root directory.
///
/// Several engines, in this process or others, may share a root. Each write
/// lands whole. `created_at` does not survive an overwrite, since the new
/// contents arrive as a new file.
pub struct FileSystemEngine<K> {
    config: FileSystemConfig,
    /// Serializes every operation on this instance
    gate: Mutex<()>,
    _key: PhantomData<fn() -> K>,
}

impl<K: StorageKey> FileSystemEngine<K> {
    /// Engine rooted at `root`. The directory is created on first write.
    pub fn open(root: impl AsRef<Path>) -> Self {
        Self::open_with_config(FileSystemConfig::new(root.as_ref()))
    }

    /// Engine with custom configuration
    pub fn open_with_config(config: FileSystemConfig) -> Self {
        Self {
            config,
            gate: Mutex::new(()),
            _key: PhantomData,
        }
    }

    /// The root directory
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// The configuration this engine was opened with
    pub fn config(&self) -> &FileSystemConfig {
        &self.config
    }

    /// Path of the file holding `key`'s value.
    pub fn path_for(&self, key: &K) -> Result<PathBuf> {
        let raw = key.raw().to_key_string();
        if raw.is_empty() {
            return Err(Error::InvalidKey(
                "empty keys have no file name".to_string(),
            ));
        }
        Ok(self.config.root.join(sanitize(&raw)))
    }

    /// When the file holding `key` was last read, if the filesystem tracks it.
    pub async fn last_accessed(&self, key: &K) -> Result<Option<SystemTime>> {
        self.timestamp(key, Metadata::accessed).await
    }

    fn key_for(file_name: &OsStr) -> Option<K> {
        let decoded = desanitize(file_name.to_str()?)?;
        let raw = <K::Raw as RawKey>::parse_key_string(&decoded).ok()?;
        // Only the canonical spelling names a key: "07" parses as 7, but 7
        // lives in the file for "7".
        if raw.to_key_string() != decoded {
            return None;
        }
        K::from_raw(raw).ok()
    }

    async fn write_locked(&self, data: &[u8], key: &K) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.config.root).await?;

        // Hidden random name, unique across engines sharing the root. The
        // leading '.' is outside the key alphabet. Dropping `temp` before
        // the rename deletes the file.
        let (file, temp) = tempfile::Builder::new()
            .prefix(".")
            .suffix(".tmp")
            .tempfile_in(&self.config.root)?
            .into_parts();
        self.write_temp(fs::File::from_std(file), data).await?;
        temp.persist(&path).map_err(|e| e.error)?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "file write");
        Ok(())
    }

    async fn write_temp(&self, mut file: fs::File, data: &[u8]) -> io::Result<()> {
        file.write_all(data).await?;
        file.flush().await?;
        if self.config.sync_mode == SyncMode::Sync {
            file.sync_all().await?;
        }
        Ok(())
    }

    async fn remove_locked(&self, key: &K) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "file remove");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_keys(&self) -> Vec<K> {
        let mut entries = match fs::read_dir(&self.config.root).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(root = %self.config.root.display(), error = %e, "cannot list root");
                return Vec::new();
            }
        };

        let mut keys = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(root = %self.config.root.display(), error = %e, "listing root failed");
                    return Vec::new();
                }
            };
            match entry.file_type().await {
                Ok(file_type) if !file_type.is_dir() => {}
                _ => continue,
            }
            let name = entry.file_name();
            match Self::key_for(&name) {
                Some(key) => keys.push(key),
                None => tracing::debug!(file = ?name, "skipping file that does not encode a key"),
            }
        }
        keys
    }

    async fn timestamp(
        &self,
        key: &K,
        pick: fn(&Metadata) -> io::Result<SystemTime>,
    ) -> Result<Option<SystemTime>> {
        let _gate = self.gate.lock().await;
        let path = self.path_for(key)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => match pick(&meta) {
                Ok(time) => Ok(Some(time)),
                Err(e) if e.kind() == io::ErrorKind::Unsupported => Ok(None),
                Err(e) => Err(e.into()),
            },
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl<K: StorageKey> StorageEngine for FileSystemEngine<K> {
    type Key = K;

    async fn write(&self, data: Vec<u8>, key: &K) -> Result<()> {
        let _gate = self.gate.lock().await;
        self.write_locked(&data, key).await
    }

    /// Writes in order under one hold of the instance gate. Each file is
    /// replaced atomically; the batch as a whole is not.
    async fn write_many(&self, pairs: Vec<(K, Vec<u8>)>) -> Result<()> {
        let _gate = self.gate.lock().await;
        for (key, data) in &pairs {
            self.write_locked(data, key).await?;
        }
        Ok(())
    }

    async fn read(&self, key: &K) -> Result<Option<Vec<u8>>> {
        let _gate = self.gate.lock().await;
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, key: &K) -> Result<()> {
        let _gate = self.gate.lock().await;
        self.remove_locked(key).await
    }

    async fn remove_many(&self, keys: &[K]) -> Result<()> {
        let _gate = self.gate.lock().await;
        for key in keys {
            self.remove_locked(key).await?;
        }
        Ok(())
    }

    async fn remove_all(&self) -> Result<()> {
        let _gate = self.gate.lock().await;
        match fs::remove_dir_all(&self.config.root).await {
            Ok(()) => {
                tracing::debug!(root = %self.config.root.display(), "removed root");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn key_exists(&self, key: &K) -> Result<bool> {
        let _gate = self.gate.lock().await;
        let path = self.path_for(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn all_keys(&self) -> Result<Vec<K>> {
        let _gate = self.gate.lock().await;
        Ok(self.list_keys().await)
    }

    /// Birth time of the key's current file, or `None` where the platform
    /// does not record one.
    ///
    /// Every write replaces the file, so this is the time of the latest
    /// write rather than the first one.
    async fn created_at(&self, key: &K) -> Result<Option<SystemTime>> {
        self.timestamp(key, Metadata::created).await
    }

    async fn updated_at(&self, key: &K) -> Result<Option<SystemTime>> {
        self.timestamp(key, Metadata::modified).await
    }
}
