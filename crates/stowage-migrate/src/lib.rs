//! # Stowage Migrate
//!
//! Moves every entry of one engine into another.
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
//! A [`Migrator`] reads each source entry, translates its key and value for
//! the destination, resolves collisions with a merge policy and writes the
//! result. Two strategies are available:
//!
//! - **Sequential** (default): one key at a time. With source removal on,
//!   each key leaves the source right after its destination write, so an
//!   interrupted run resumes by running it again.
//! - **All at once**: read everything, resolve, write one destination batch,
//!   then clear the source if asked. A failed batch leaves the source
//!   untouched.
//!
//! The migrator takes no lock across the two engines; callers writing to
//! either engine during a migration race with it.

use std::collections::HashMap;
use std::fmt;
use stowage_core::{Error, Result, StorageEngine, StorageKey};

/// Verdict of a merge policy for a key present on both sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeResolution {
    /// Leave the destination value as it is
    KeepExisting,
    /// Write this value to the destination
    Replace(Vec<u8>),
}

/// Translates a source key into a destination key
pub type KeyTranslator<S, D> = Box<dyn Fn(&S) -> Result<D> + Send + Sync>;

/// Translates a source value into a destination value
pub type ValueTranslator = Box<dyn Fn(Vec<u8>) -> Result<Vec<u8>> + Send + Sync>;

/// Resolves `(existing destination value, incoming value)` collisions
pub type MergePolicy = Box<dyn Fn(&[u8], &[u8]) -> MergeResolution + Send + Sync>;

/// Merge policy that always takes the incoming value (the default).
pub fn replace_with_incoming() -> MergePolicy {
    Box::new(|_existing, incoming| MergeResolution::Replace(incoming.to_vec()))
}

/// Merge policy that never overwrites the destination.
pub fn keep_existing() -> MergePolicy {
    Box::new(|_existing, _incoming| MergeResolution::KeepExisting)
}

/// Migration options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Migrate key by key instead of in one batch
    pub perform_sequentially: bool,
    /// Delete migrated entries from the source
    pub remove_source_after_migration: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            perform_sequentially: true,
            remove_source_after_migration: false,
        }
    }
}

/// Counts gathered during one migration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Source entries read
    pub read: usize,
    /// Entries written to destination keys that had no value
    pub written: usize,
    /// Collisions the merge policy resolved with a replacement
    pub replaced: usize,
    /// Collisions the merge policy resolved by keeping the existing value
    pub kept_existing: usize,
    /// Source keys listed without a readable value
    pub skipped_missing: usize,
    /// Entries removed from the source
    pub removed_from_source: usize,
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Migration Report:")?;
        writeln!(f, "  Read: {}", self.read)?;
        writeln!(f, "  Written: {}", self.written)?;
        writeln!(f, "  Replaced: {}", self.replaced)?;
        writeln!(f, "  Kept existing: {}", self.kept_existing)?;
        writeln!(f, "  Skipped (no value): {}", self.skipped_missing)?;
        writeln!(f, "  Removed from source: {}", self.removed_from_source)?;
        Ok(())
    }
}

/// Moves data from a source engine into a destination engine.
///
/// # Examples
///
/// ```rust
/// use stowage_core::{CacheKey, Identifier, MemoryEngine, StorageEngine};
/// use stowage_migrate::{keep_existing, Migrator};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let source: MemoryEngine<CacheKey> = MemoryEngine::new();
/// let destination: MemoryEngine<Identifier> = MemoryEngine::new();
/// source.write(b"1".to_vec(), &CacheKey::new("a")).await?;
///
/// let report = Migrator::new(&source, &destination)
///     .remove_source_after_migration(true)
///     .merge_conflict(keep_existing())
///     .migrate()
///     .await?;
///
/// assert_eq!(report.written, 1);
/// assert_eq!(source.key_count().await?, 0);
/// # Ok::<(), stowage_core::Error>(())
/// # }).unwrap();
/// ```
pub struct Migrator<'a, S: StorageEngine, D: StorageEngine> {
    source: &'a S,
    destination: &'a D,
    config: MigrationConfig,
    translate_key: KeyTranslator<S::Key, D::Key>,
    translate_value: ValueTranslator,
    merge_conflict: MergePolicy,
}

impl<'a, S, D> Migrator<'a, S, D>
where
    S: StorageEngine,
    D: StorageEngine,
    D::Key: StorageKey<Raw = <S::Key as StorageKey>::Raw>,
{
    /// Migrator between engines whose key types share a raw kind.
    ///
    /// Keys are converted with [`StorageKey::convert`]; values are copied
    /// unchanged.
    pub fn new(source: &'a S, destination: &'a D) -> Self {
        Self::with_translators(
            source,
            destination,
            |key: &S::Key| {
                <D::Key as StorageKey>::convert(key).map_err(|e| {
                    Error::KeyTranslation(format!("{:?} has no destination form: {}", key, e))
                })
            },
            Ok,
        )
    }
}

impl<'a, S, D> Migrator<'a, S, D>
where
    S: StorageEngine,
    D: StorageEngine,
{
    /// Migrator with explicit key and value translators.
    pub fn with_translators<KT, VT>(
        source: &'a S,
        destination: &'a D,
        translate_key: KT,
        translate_value: VT,
    ) -> Self
    where
        KT: Fn(&S::Key) -> Result<D::Key> + Send + Sync + 'static,
        VT: Fn(Vec<u8>) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            source,
            destination,
            config: MigrationConfig::default(),
            translate_key: Box::new(translate_key),
            translate_value: Box::new(translate_value),
            merge_conflict: replace_with_incoming(),
        }
    }

    /// Replace all options at once
    pub fn config(mut self, config: MigrationConfig) -> Self {
        self.config = config;
        self
    }

    /// Choose between the sequential and the all-at-once strategy
    pub fn perform_sequentially(mut self, sequential: bool) -> Self {
        self.config.perform_sequentially = sequential;
        self
    }

    /// Delete migrated entries from the source
    pub fn remove_source_after_migration(mut self, remove: bool) -> Self {
        self.config.remove_source_after_migration = remove;
        self
    }

    /// Set the value translator
    pub fn translate_value<VT>(mut self, translate_value: VT) -> Self
    where
        VT: Fn(Vec<u8>) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        self.translate_value = Box::new(translate_value);
        self
    }

    /// Set the merge policy
    pub fn merge_conflict<M>(mut self, policy: M) -> Self
    where
        M: Fn(&[u8], &[u8]) -> MergeResolution + Send + Sync + 'static,
    {
        self.merge_conflict = Box::new(policy);
        self
    }

    /// The options this migrator runs with
    pub fn options(&self) -> MigrationConfig {
        self.config
    }

    /// Runs the migration.
    ///
    /// Stops at the first error. What has already happened at that point
    /// depends on the strategy, see the crate documentation.
    #[tracing::instrument(skip_all)]
    pub async fn migrate(&self) -> Result<MigrationReport> {
        tracing::info!(
            sequential = self.config.perform_sequentially,
            remove_source = self.config.remove_source_after_migration,
            "migration started"
        );
        let mut report = MigrationReport::default();

        let outcome = if self.config.perform_sequentially {
            self.migrate_sequentially(&mut report).await
        } else {
            self.migrate_all_at_once(&mut report).await
        };

        match outcome {
            Ok(()) => {
                tracing::info!(
                    read = report.read,
                    written = report.written,
                    replaced = report.replaced,
                    kept_existing = report.kept_existing,
                    skipped_missing = report.skipped_missing,
                    removed = report.removed_from_source,
                    "migration finished"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, read = report.read, "migration stopped");
                Err(e)
            }
        }
    }

    async fn migrate_sequentially(&self, report: &mut MigrationReport) -> Result<()> {
        let keys = self.source.all_keys().await?;

        for key in keys {
            let Some(value) = self.source.read(&key).await? else {
                report.skipped_missing += 1;
                continue;
            };
            report.read += 1;

            let destination_key = (self.translate_key)(&key)?;
            let incoming = (self.translate_value)(value)?;

            match self.destination.read(&destination_key).await? {
                Some(existing) => match (self.merge_conflict)(&existing, &incoming) {
                    MergeResolution::KeepExisting => report.kept_existing += 1,
                    MergeResolution::Replace(resolved) => {
                        self.destination.write(resolved, &destination_key).await?;
                        report.replaced += 1;
                    }
                },
                None => {
                    self.destination.write(incoming, &destination_key).await?;
                    report.written += 1;
                }
            }

            if self.config.remove_source_after_migration {
                self.source.remove(&key).await?;
                report.removed_from_source += 1;
            }
        }
        Ok(())
    }

    async fn migrate_all_at_once(&self, report: &mut MigrationReport) -> Result<()> {
        let pairs = self.source.read_all_keys_and_values().await?;
        report.read = pairs.len();

        let mut translated = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            translated.push(((self.translate_key)(&key)?, (self.translate_value)(value)?));
        }

        let candidates: Vec<D::Key> = translated.iter().map(|(key, _)| key.clone()).collect();
        let colliding = self.destination.keys_exist(&candidates).await?;
        let existing: HashMap<D::Key, Vec<u8>> = self
            .destination
            .read_many(&colliding)
            .await?
            .into_iter()
            .collect();

        let mut pending: Vec<(D::Key, Vec<u8>)> = Vec::with_capacity(translated.len());
        let mut slots: HashMap<D::Key, usize> = HashMap::new();

        for (key, incoming) in translated {
            // Two source keys can translate to the same destination key.
            if let Some(&slot) = slots.get(&key) {
                match (self.merge_conflict)(&pending[slot].1, &incoming) {
                    MergeResolution::KeepExisting => report.kept_existing += 1,
                    MergeResolution::Replace(resolved) => {
                        pending[slot].1 = resolved;
                        report.replaced += 1;
                    }
                }
                continue;
            }

            let resolved = match existing.get(&key) {
                Some(current) => match (self.merge_conflict)(current, &incoming) {
                    MergeResolution::KeepExisting => {
                        report.kept_existing += 1;
                        continue;
                    }
                    MergeResolution::Replace(resolved) => {
                        report.replaced += 1;
                        resolved
                    }
                },
                None => {
                    report.written += 1;
                    incoming
                }
            };
            slots.insert(key.clone(), pending.len());
            pending.push((key, resolved));
        }

        self.destination.write_many(pending).await?;

        if self.config.remove_source_after_migration {
            self.source.remove_all().await?;
            report.removed_from_source = report.read;
        }
        Ok(())
    }
}
