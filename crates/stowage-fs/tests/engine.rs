// Integration tests for the filesystem engine

mod common;

use common::FsTestFixture;
use std::collections::HashMap;
use std::sync::Arc;
use stowage_core::{CacheKey, IntKey, StorageEngine};
use stowage_fs::{desanitize, sanitize};

fn key(s: &str) -> CacheKey {
    CacheKey::new(s)
}

#[tokio::test]
async fn test_round_trip_awkward_keys() {
    let fixture = FsTestFixture::new();
    let engine = fixture.engine::<CacheKey>();

    let raw_keys = [
        "plain",
        "with/slash",
        "../escape",
        "spaces in key",
        "ünïcødé",
        "🦀",
        "trailing.",
        "UPPER",
        "upper",
    ];
    for (i, raw) in raw_keys.iter().enumerate() {
        engine.write(vec![i as u8], &key(raw)).await.unwrap();
    }

    for (i, raw) in raw_keys.iter().enumerate() {
        assert_eq!(engine.read(&key(raw)).await.unwrap(), Some(vec![i as u8]), "{}", raw);
    }

    let mut keys = engine.all_keys().await.unwrap();
    keys.sort();
    let mut expected: Vec<_> = raw_keys.iter().map(|raw| key(raw)).collect();
    expected.sort();
    assert_eq!(keys, expected);

    // Flat layout: one file per key directly under the root.
    let files = fixture.list_files();
    assert_eq!(files.len(), raw_keys.len());
    for file in files {
        assert!(desanitize(&file).is_some(), "unexpected file {}", file);
    }
}

#[tokio::test]
async fn test_batch_write_then_read() {
    let fixture = FsTestFixture::new();
    let engine = fixture.engine::<CacheKey>();

    engine
        .write_many(vec![(key("x"), b"1".to_vec()), (key("y"), b"2".to_vec())])
        .await
        .unwrap();

    let pairs: HashMap<_, _> = engine
        .read_all_keys_and_values()
        .await
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[&key("x")], b"1".to_vec());
    assert_eq!(pairs[&key("y")], b"2".to_vec());
}

#[tokio::test]
async fn test_keys_exist_is_subset_of_query() {
    let fixture = FsTestFixture::new();
    let engine = fixture.engine::<IntKey>();

    for i in 0..10 {
        engine.write(vec![1], &IntKey::new(i * 2)).await.unwrap();
    }

    let query: Vec<_> = (0..6).map(IntKey::new).collect();
    let present = engine.keys_exist(&query).await.unwrap();
    assert_eq!(present, vec![IntKey::new(0), IntKey::new(2), IntKey::new(4)]);

    let stored = engine.all_keys().await.unwrap();
    for k in &present {
        assert!(query.contains(k));
        assert!(stored.contains(k));
    }
}

#[tokio::test]
async fn test_foreign_files_do_not_break_enumeration() {
    let fixture = FsTestFixture::new();
    let engine = fixture.engine::<CacheKey>();
    engine.write(b"v".to_vec(), &key("mine")).await.unwrap();

    std::fs::write(fixture.root.join("Thumbs.db"), b"junk").unwrap();
    std::fs::write(fixture.root.join("YQ=="), b"raw padding").unwrap();
    std::fs::create_dir(fixture.root.join("subdir")).unwrap();

    assert_eq!(engine.all_keys().await.unwrap(), vec![key("mine")]);
    assert_eq!(engine.read_all_values().await.unwrap(), vec![b"v".to_vec()]);
    assert_eq!(engine.key_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_writers_on_one_instance() {
    let fixture = FsTestFixture::new();
    let engine = Arc::new(fixture.engine::<IntKey>());

    let mut handles = Vec::new();
    for task in 0..8i64 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            for i in 0..10i64 {
                let k = IntKey::new(task * 100 + i);
                engine.write(k.get().to_le_bytes().to_vec(), &k).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(engine.key_count().await.unwrap(), 80);
    let value = engine.read(&IntKey::new(705)).await.unwrap().unwrap();
    assert_eq!(value, 705i64.to_le_bytes().to_vec());
    assert!(fixture.list_files().iter().all(|f| !f.starts_with('.')));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_on_separate_instances() {
    let fixture = FsTestFixture::new();

    let mut handles = Vec::new();
    for task in 0..4u8 {
        // Each task has its own engine on the same root
        let engine = fixture.engine::<IntKey>();
        handles.push(tokio::spawn(async move {
            for i in 0..100i64 {
                let k = IntKey::new(i64::from(task) * 1000 + i);
                engine.write(vec![task; 4096], &k).await?;
            }
            Ok::<_, stowage_core::Error>(())
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let reader = fixture.engine::<IntKey>();
    for task in 0..4u8 {
        for i in 0..100i64 {
            let k = IntKey::new(i64::from(task) * 1000 + i);
            assert_eq!(reader.read(&k).await.unwrap(), Some(vec![task; 4096]), "{:?}", k);
        }
    }
    assert_eq!(reader.key_count().await.unwrap(), 400);
    assert!(fixture.list_files().iter().all(|f| !f.starts_with('.')));
}

#[tokio::test]
async fn test_same_value_rewritten_across_instances() {
    let fixture = FsTestFixture::new();
    let first = fixture.engine::<CacheKey>();
    first.write(b"one".to_vec(), &key("shared")).await.unwrap();

    let second = fixture.engine::<CacheKey>();
    second.write(b"two".to_vec(), &key("shared")).await.unwrap();

    assert_eq!(first.read(&key("shared")).await.unwrap(), Some(b"two".to_vec()));
    assert_eq!(fixture.list_files(), vec![sanitize("shared")]);
}
