// Integration tests migrating between filesystem and memory engines

use std::collections::HashMap;
use stowage_core::{CacheKey, Identifier, IntKey, KeyErasingEngine, MemoryEngine, StorageEngine};
use stowage_fs::FileSystemEngine;
use stowage_migrate::{keep_existing, MigrationConfig, Migrator};
use tempfile::TempDir;

#[tokio::test]
async fn test_memory_to_filesystem_all_at_once() {
    let dir = TempDir::new().unwrap();
    let source: MemoryEngine<CacheKey> = MemoryEngine::new();
    for i in 0..20 {
        source
            .write(format!("value-{}", i).into_bytes(), &CacheKey::new(format!("k/{}", i)))
            .await
            .unwrap();
    }
    let destination: FileSystemEngine<CacheKey> = FileSystemEngine::open(dir.path());

    let report = Migrator::new(&source, &destination)
        .config(MigrationConfig {
            perform_sequentially: false,
            remove_source_after_migration: true,
        })
        .migrate()
        .await
        .unwrap();

    assert_eq!(report.read, 20);
    assert_eq!(report.removed_from_source, 20);
    assert_eq!(source.key_count().await.unwrap(), 0);
    assert_eq!(destination.key_count().await.unwrap(), 20);
    assert_eq!(
        destination.read(&CacheKey::new("k/7")).await.unwrap(),
        Some(b"value-7".to_vec())
    );
}

#[tokio::test]
async fn test_filesystem_to_memory_with_stricter_keys() {
    let dir = TempDir::new().unwrap();
    let source: FileSystemEngine<CacheKey> = FileSystemEngine::open(dir.path());
    source.write(b"a".to_vec(), &CacheKey::new("alpha")).await.unwrap();
    source.write(b"b".to_vec(), &CacheKey::new("beta")).await.unwrap();

    let destination: MemoryEngine<Identifier> = MemoryEngine::new();
    destination
        .write(b"old".to_vec(), &Identifier::new("alpha").unwrap())
        .await
        .unwrap();

    let report = Migrator::new(&source, &destination)
        .merge_conflict(keep_existing())
        .remove_source_after_migration(true)
        .migrate()
        .await
        .unwrap();

    assert_eq!(report.kept_existing, 1);
    assert_eq!(report.written, 1);
    assert!(source.all_keys().await.unwrap().is_empty());

    let stored: HashMap<_, _> = destination
        .read_all_keys_and_values()
        .await
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(stored[&Identifier::new("alpha").unwrap()], b"old".to_vec());
    assert_eq!(stored[&Identifier::new("beta").unwrap()], b"b".to_vec());
}

#[tokio::test]
async fn test_between_filesystem_roots_through_adapter() {
    let dir = TempDir::new().unwrap();
    let source: FileSystemEngine<IntKey> = FileSystemEngine::open(dir.path().join("ints"));
    for i in 1..=3 {
        source.write(vec![i as u8], &IntKey::new(i)).await.unwrap();
    }

    // Destination addressed by Identifier but stored under CacheKey names.
    let inner: FileSystemEngine<CacheKey> = FileSystemEngine::open(dir.path().join("named"));
    let destination: KeyErasingEngine<Identifier, _> = KeyErasingEngine::new(inner);

    Migrator::with_translators(
        &source,
        &destination,
        |k: &IntKey| Identifier::new(format!("item-{}", k.get())),
        Ok,
    )
    .perform_sequentially(false)
    .migrate()
    .await
    .unwrap();

    let mut keys = destination.inner().all_keys().await.unwrap();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            CacheKey::new("item-1"),
            CacheKey::new("item-2"),
            CacheKey::new("item-3")
        ]
    );
    assert_eq!(source.key_count().await.unwrap(), 3);
}
