use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stowage_core::{CacheKey, StorageEngine};
use stowage_fs::{sanitize, FileSystemConfig, FileSystemEngine, SyncMode};
use tempfile::tempdir;

fn bench_sanitize(c: &mut Criterion) {
    c.bench_function("sanitize_64b_key", |b| {
        let raw = "users/2024/profile-images/large/0123456789abcdef0123456789abcdef";
        b.iter(|| sanitize(black_box(raw)))
    });
}

fn bench_write_read(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let dir = tempdir().unwrap();
    let config = FileSystemConfig::new(dir.path()).with_sync_mode(SyncMode::None);
    let engine: FileSystemEngine<CacheKey> = FileSystemEngine::open_with_config(config);
    let value = vec![0xAB; 1024];

    c.bench_function("fs_write_1kb", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            let key = CacheKey::new(format!("key-{}", i % 256));
            runtime.block_on(engine.write(value.clone(), &key)).unwrap();
        })
    });

    runtime
        .block_on(engine.write(value.clone(), &CacheKey::new("hot")))
        .unwrap();
    c.bench_function("fs_read_1kb", |b| {
        let key = CacheKey::new("hot");
        b.iter(|| runtime.block_on(engine.read(black_box(&key))).unwrap())
    });
}

criterion_group!(benches, bench_sanitize, bench_write_read);
criterion_main!(benches);
