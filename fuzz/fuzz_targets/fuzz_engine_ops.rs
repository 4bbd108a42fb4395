#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::HashMap;
use stowage::{CacheKey, FileSystemConfig, FileSystemEngine, StorageEngine, SyncMode};

#[derive(Arbitrary, Debug)]
enum EngineOp {
    Write { key: String, value: Vec<u8> },
    Read { key: String },
    Remove { key: String },
    RemoveAll,
    Count,
}

fuzz_target!(|ops: Vec<EngineOp>| {
    let Ok(dir) = tempfile::tempdir() else { return };
    let Ok(runtime) = tokio::runtime::Builder::new_current_thread().build() else {
        return;
    };
    let config = FileSystemConfig::new(dir.path().join("store")).with_sync_mode(SyncMode::None);
    let engine: FileSystemEngine<CacheKey> = FileSystemEngine::open_with_config(config);
    let mut model: HashMap<String, Vec<u8>> = HashMap::new();

    runtime.block_on(async {
        // Limit operations and sizes to prevent timeouts
        for op in ops.into_iter().take(64) {
            match op {
                EngineOp::Write { key, value } => {
                    if key.is_empty() || key.len() > 64 || value.len() > 1024 {
                        continue;
                    }
                    engine.write(value.clone(), &CacheKey::new(key.clone())).await.unwrap();
                    model.insert(key, value);
                }
                EngineOp::Read { key } => {
                    if key.is_empty() || key.len() > 64 {
                        continue;
                    }
                    let stored = engine.read(&CacheKey::new(key.clone())).await.unwrap();
                    assert_eq!(stored.as_ref(), model.get(&key));
                }
                EngineOp::Remove { key } => {
                    if key.is_empty() || key.len() > 64 {
                        continue;
                    }
                    engine.remove(&CacheKey::new(key.clone())).await.unwrap();
                    model.remove(&key);
                }
                EngineOp::RemoveAll => {
                    engine.remove_all().await.unwrap();
                    model.clear();
                }
                EngineOp::Count => {
                    assert_eq!(engine.key_count().await.unwrap(), model.len());
                }
            }
        }
    });
});
