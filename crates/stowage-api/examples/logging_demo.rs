use stowage::logging::{LogConfig, LogFormat};
use stowage::{CacheKey, FileSystemEngine, StorageEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Debug output for the stowage crates, compact lines on stdout
    let _guard = LogConfig::stowage_debug()
        .with_format(LogFormat::Compact)
        .init();

    println!("=== Stowage Logging Demo ===\n");

    let dir = tempfile::tempdir()?;
    let store: FileSystemEngine<CacheKey> = FileSystemEngine::open(dir.path().join("store"));

    println!("1. Writing...");
    store.write(b"Alice".to_vec(), &CacheKey::new("user:1")).await?;
    store.write(b"Bob".to_vec(), &CacheKey::new("user:2")).await?;

    println!("\n2. Reading...");
    if let Some(value) = store.read(&CacheKey::new("user:1")).await? {
        println!("Found: {}", String::from_utf8_lossy(&value));
    }

    println!("\n3. A stray file in the root is skipped when listing");
    std::fs::write(store.root().join("notes.txt"), b"not a key")?;
    println!("Keys: {:?}", store.all_keys().await?);

    println!("\n4. Clearing...");
    store.remove_all().await?;

    println!("\n=== Demo Complete ===");
    Ok(())
}
