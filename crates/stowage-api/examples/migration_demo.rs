use stowage::logging::LogConfig;
use stowage::{
    keep_existing, CacheKey, FileSystemEngine, MemoryEngine, Migrator, StorageEngine,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = LogConfig::info().init();

    println!("=== Stowage Migration Demo ===\n");

    // Data that has been living in memory so far
    let cache: MemoryEngine<CacheKey> = MemoryEngine::new();
    for (key, value) in [
        ("session/42", "alice"),
        ("session/43", "bob"),
        ("settings/theme", "dark"),
    ] {
        cache.write(value.as_bytes().to_vec(), &CacheKey::new(key)).await?;
    }

    // The new home already holds a newer theme setting
    let dir = tempfile::tempdir()?;
    let disk: FileSystemEngine<CacheKey> = FileSystemEngine::open(dir.path().join("store"));
    disk.write(b"light".to_vec(), &CacheKey::new("settings/theme")).await?;

    println!("1. Sequential migration keeping existing destination values");
    let report = Migrator::new(&cache, &disk)
        .merge_conflict(keep_existing())
        .remove_source_after_migration(true)
        .migrate()
        .await?;
    println!("{}", report);

    println!("\n2. Destination contents");
    let mut entries = disk.read_all_keys_and_values().await?;
    entries.sort();
    for (key, value) in entries {
        println!("  {} = {}", key, String::from_utf8_lossy(&value));
    }
    println!("Keys left in memory: {}", cache.key_count().await?);

    println!("\n3. Moving everything back in one batch, uppercasing values");
    let back: MemoryEngine<CacheKey> = MemoryEngine::new();
    let report = Migrator::new(&disk, &back)
        .perform_sequentially(false)
        .translate_value(|value| Ok(value.to_ascii_uppercase()))
        .migrate()
        .await?;
    println!("{}", report);

    println!("\n=== Demo Complete ===");
    Ok(())
}
