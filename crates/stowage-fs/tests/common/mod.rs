// Common test utilities for filesystem engine integration tests

use std::fs;
use std::path::PathBuf;
use stowage_core::StorageKey;
use stowage_fs::FileSystemEngine;
use tempfile::TempDir;

/// Test fixture that owns a temporary root directory
pub struct FsTestFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl FsTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("store");

        Self { temp_dir, root }
    }

    pub fn engine<K: StorageKey>(&self) -> FileSystemEngine<K> {
        FileSystemEngine::open(&self.root)
    }

    #[allow(dead_code)]
    pub fn list_files(&self) -> Vec<String> {
        fs::read_dir(&self.root)
            .expect("Failed to read root directory")
            .filter_map(|entry| {
                entry
                    .ok()
                    .and_then(|e| e.file_name().to_str().map(String::from))
            })
            .collect()
    }
}

impl Default for FsTestFixture {
    fn default() -> Self {
        Self::new()
    }
}
