//! # Stowage
//!
//! Pluggable async key-value storage. Pick an engine, write bytes under
//! typed keys, and move data between engines when your storage needs change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stowage::{CacheKey, FileSystemEngine, StorageEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One file per key under ./my_store
//!     let store: FileSystemEngine<CacheKey> = FileSystemEngine::open("./my_store");
//!
//!     store.write(b"Alice".to_vec(), &CacheKey::new("user:1:name")).await?;
//!
//!     if let Some(name) = store.read(&CacheKey::new("user:1:name")).await? {
//!         println!("Name: {}", String::from_utf8_lossy(&name));
//!     }
//!
//!     store.remove(&CacheKey::new("user:1:name")).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Engines
//!
//! - [`FileSystemEngine`]: one file per key, filenames derived from the key
//!   so any string is safe to use.
//! - [`MemoryEngine`]: a process-local map, handy for tests and caches.
//! - [`KeyErasingEngine`]: presents any engine under a different key type
//!   sharing the same raw representation.
//!
//! Implement [`StorageEngine`] to add your own; only six primitive
//! operations are required and every batch operation has a default.
//!
//! ## Migration
//!
//! ```rust,no_run
//! use stowage::{CacheKey, FileSystemEngine, MemoryEngine, Migrator};
//!
//! # async fn run() -> stowage::Result<()> {
//! let old: MemoryEngine<CacheKey> = MemoryEngine::new();
//! let new: FileSystemEngine<CacheKey> = FileSystemEngine::open("./store");
//!
//! let report = Migrator::new(&old, &new)
//!     .perform_sequentially(false)
//!     .remove_source_after_migration(true)
//!     .migrate()
//!     .await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod logging;
pub mod object;

// Engine contract and key types
pub use stowage_core::{
    CacheKey, Error, Identifier, IntKey, KeyErasingEngine, MemoryEngine, RawKey, Result,
    StorageEngine, StorageKey,
};

// Filesystem engine
pub use stowage_fs::{
    desanitize, sanitize, FileSystemConfig, FileSystemEngine, SyncMode, DEFAULT_ROOT,
};

// Migration
pub use stowage_migrate::{
    keep_existing, replace_with_incoming, KeyTranslator, MergePolicy, MergeResolution,
    MigrationConfig, MigrationReport, Migrator, ValueTranslator,
};

pub use object::{BincodeCodec, Codec, ObjectStorage};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
