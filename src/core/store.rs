//! Durable key-value storage behind the tree and repository list caches.
//!
//! # Public API
//! - [`DurableStore`]: Minimal key-value contract (get/set/remove/keys)
//! - [`FileStore`]: One JSON file per key under the cache directory
//! - [`MemoryStore`]: In-process store with an optional key quota
//!
//! # Cache Strategy
//! - **Best effort**: callers treat every error as a cache miss
//! - **Hashed file names**: keys contain `/` and `:`, so files are named by
//!   the MD5 of the key and the key itself is kept inside the file

use crate::core::error::{MentionError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait DurableStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: &Value) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

#[derive(Serialize, Deserialize)]
struct StoredItem {
    key: String,
    value: Value,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform cache directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::core::dirs::get_store_directory()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{:x}.json", md5::compute(key.as_bytes())))
    }

    fn read_item(path: &Path) -> Result<StoredItem> {
        let content =
            fs::read_to_string(path).map_err(|e| MentionError::cache_read_failed(path, e))?;
        serde_json::from_str(&content).map_err(|e| MentionError::cache_parse_failed(path, e))
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let item = Self::read_item(&path)?;
        if item.key != key {
            log::debug!("Store file {} belongs to another key", path.display());
            return Ok(None);
        }
        Ok(Some(item.value))
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            return Err(MentionError::cache_directory_creation_failed(&self.dir, e));
        }
        let path = self.path_for(key);
        let item = StoredItem {
            key: key.to_string(),
            value: value.clone(),
        };
        let json = serde_json::to_string(&item)?;
        fs::write(&path, json).map_err(|e| MentionError::cache_write_failed(&path, e))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MentionError::cache_write_failed(&path, e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_item(&path) {
                Ok(item) => keys.push(item.key),
                // no key to report, so nothing else could ever remove it
                Err(e) => {
                    log::warn!("Removing unreadable store file: {e}");
                    if let Err(e) = fs::remove_file(&path) {
                        log::warn!("Failed to remove {}: {e}", path.display());
                    }
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, Value>,
    max_keys: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that refuses to hold more than `max_keys` keys.
    pub fn with_quota(max_keys: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            max_keys: Some(max_keys),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        if let Some(max) = self.max_keys {
            if !self.items.contains_key(key) && self.items.len() >= max {
                return Err(MentionError::storage_quota_exceeded(key));
            }
        }
        self.items.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = FileStore::new(dir.path().join("store"));
        store.set("tree_octo/repo:main", &json!({"files": [], "timestamp": 5}))?;

        let value = store.get("tree_octo/repo:main")?;
        assert_eq!(value, Some(json!({"files": [], "timestamp": 5})));
        assert_eq!(store.keys()?, vec!["tree_octo/repo:main".to_string()]);

        store.remove("tree_octo/repo:main")?;
        assert_eq!(store.get("tree_octo/repo:main")?, None);
        assert!(store.keys()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_file_store_missing_dir_has_no_keys() -> Result<()> {
        let dir = TempDir::new()?;
        let store = FileStore::new(dir.path().join("never-created"));
        assert!(store.keys()?.is_empty());
        assert_eq!(store.get("anything")?, None);
        Ok(())
    }

    #[test]
    fn test_file_store_corrupt_file_is_an_error() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = FileStore::new(dir.path());
        store.set("k", &json!(1))?;
        fs::write(store.path_for("k"), "{\"key\": \"k\", \"val")?;

        assert!(matches!(
            store.get("k"),
            Err(MentionError::CacheParseFailed { .. })
        ));
        assert!(store.get("k").is_err());
        store.remove("k")?;
        assert_eq!(store.get("k")?, None);
        Ok(())
    }

    #[test]
    fn test_listing_keys_removes_unreadable_files() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = FileStore::new(dir.path());
        store.set("tree_a", &json!({"files": [], "timestamp": 1}))?;
        store.set("tree_b", &json!({"files": [], "timestamp": 2}))?;
        fs::write(store.path_for("tree_a"), "not json")?;

        assert_eq!(store.keys()?, vec!["tree_b".to_string()]);
        assert!(!store.path_for("tree_a").exists());
        assert!(store.path_for("tree_b").exists());
        Ok(())
    }

    #[test]
    fn test_memory_store_quota() -> Result<()> {
        let mut store = MemoryStore::with_quota(1);
        store.set("a", &json!(1))?;
        store.set("a", &json!(2))?;
        let err = store.set("b", &json!(3)).unwrap_err();
        assert!(matches!(err, MentionError::StorageQuotaExceeded { .. }));
        assert_eq!(store.get("a")?, Some(json!(2)));
        assert_eq!(store.len(), 1);
        Ok(())
    }
}
