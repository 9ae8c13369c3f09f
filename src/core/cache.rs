//! Two-tier cache of repository trees.
//!
//! This module provides [`RepositoryIndexCache`], which keeps up to
//! `max_entries` [`TreeIndex`] snapshots in memory (LRU) and mirrors smaller
//! trees to a [`DurableStore`] so they survive restarts.
//!
//! # Cache Strategy
//! - **TTL**: entries older than `max_age_ms` are evicted on read
//! - **LRU**: reads promote, inserts of new keys evict the least recent entry
//! - **Durable mirror**: trees below `persist_threshold` files are written as
//!   `{files, timestamp}` (first `durable_max_files` files) under
//!   `tree_<cacheKey>`; only the `durable_max_keys` newest keys are kept
//! - **Best effort**: storage failures are logged and never returned
//!
//! The cache never fetches. A miss is the caller's cue to ask a provider.

use crate::core::clock::Clock;
use crate::core::config::CacheConfig;
use crate::core::model::FileNode;
use crate::core::store::DurableStore;
use crate::core::tree_index::TreeIndex;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::rc::Rc;

pub const TREE_KEY_PREFIX: &str = "tree_";

/// `owner/repo` optionally suffixed with `:branch`.
pub fn cache_key(repo_full_name: &str, branch: Option<&str>) -> String {
    match branch {
        Some(branch) if !branch.is_empty() => format!("{repo_full_name}:{branch}"),
        _ => repo_full_name.to_string(),
    }
}

pub fn storage_key(cache_key: &str) -> String {
    format!("{TREE_KEY_PREFIX}{cache_key}")
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedTree {
    files: Vec<FileNode>,
    timestamp: i64,
}

pub struct RepositoryIndexCache<S: DurableStore> {
    config: CacheConfig,
    clock: Rc<dyn Clock>,
    store: S,
    memory: LruCache<String, TreeIndex>,
}

impl<S: DurableStore> RepositoryIndexCache<S> {
    /// Create an empty memory tier over `store`. Existing durable entries are
    /// left untouched and picked up by [`Self::load_from_durable`].
    pub fn new(store: S, config: CacheConfig, clock: Rc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            clock,
            store,
            memory: LruCache::new(capacity),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Memory keys, most recently used first.
    pub fn keys(&self) -> Vec<String> {
        self.memory.iter().map(|(k, _)| k.clone()).collect()
    }

    fn is_expired(&self, created_at_ms: i64) -> bool {
        self.clock.now_ms() - created_at_ms > self.config.max_age_ms
    }

    /// Drop `key` from memory if it has outlived `max_age_ms`.
    fn evict_if_expired(&mut self, key: &str) -> bool {
        let expired = match self.memory.peek(key) {
            Some(entry) => self.is_expired(entry.created_at_ms()),
            None => return false,
        };
        if expired {
            log::debug!("Tree cache entry expired: {key}");
            self.memory.pop(key);
        }
        expired
    }

    /// Fresh entry for `key`, promoted to most recently used.
    pub fn get(&mut self, key: &str) -> Option<&TreeIndex> {
        if self.evict_if_expired(key) {
            return None;
        }
        self.memory.get(key)
    }

    /// Whether a fresh entry exists, without touching recency.
    pub fn contains(&mut self, key: &str) -> bool {
        !self.evict_if_expired(key) && self.memory.contains(key)
    }

    /// Index `files` under `key`, replacing any previous snapshot.
    pub fn set(&mut self, key: &str, files: Vec<FileNode>) {
        let now = self.clock.now_ms();
        let file_count = files.len();

        let persisted = (file_count < self.config.persist_threshold).then(|| PersistedTree {
            files: files
                .iter()
                .take(self.config.durable_max_files)
                .cloned()
                .collect(),
            timestamp: now,
        });

        let index = TreeIndex::build(key, files, now, self.config.fuzzy_threshold);
        if let Some((evicted, _)) = self.memory.push(key.to_string(), index) {
            if evicted != key {
                log::debug!("Evicted least recently used tree: {evicted}");
            }
        }
        log::debug!("Cached {file_count} files for {key}");

        if let Some(persisted) = persisted {
            self.persist(key, &persisted);
        } else {
            log::debug!("{key} has {file_count} files, keeping it memory-only");
        }
    }

    fn persist(&mut self, key: &str, tree: &PersistedTree) {
        let value = match serde_json::to_value(tree) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to serialize tree for {key}: {e}");
                return;
            }
        };
        match self.store.set(&storage_key(key), &value) {
            Ok(()) => {}
            Err(e) if e.is_storage_error() => {
                log::debug!("Keeping {key} memory-only: {e}");
                return;
            }
            Err(e) => {
                log::warn!("Failed to persist tree for {key}: {e}");
                return;
            }
        }
        self.prune_durable();
    }

    /// Keep only the `durable_max_keys` most recently written tree keys.
    fn prune_durable(&mut self) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("Failed to list durable keys: {e}");
                return;
            }
        };
        let tree_keys: Vec<String> = keys
            .into_iter()
            .filter(|k| k.starts_with(TREE_KEY_PREFIX))
            .collect();
        if tree_keys.len() <= self.config.durable_max_keys {
            return;
        }

        let mut stamped: Vec<(i64, String)> = tree_keys
            .into_iter()
            .map(|k| {
                let timestamp = self
                    .store
                    .get(&k)
                    .ok()
                    .flatten()
                    .and_then(|v| v.get("timestamp").and_then(|t| t.as_i64()))
                    .unwrap_or(0);
                (timestamp, k)
            })
            .collect();
        stamped.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, key) in stamped.into_iter().skip(self.config.durable_max_keys) {
            log::debug!("Pruning durable tree entry {key}");
            if let Err(e) = self.store.remove(&key) {
                log::warn!("Failed to prune durable entry {key}: {e}");
            }
        }
    }

    /// Files persisted for `key`, if present, fresh and well-formed.
    /// Anything else is removed and reported as a miss.
    pub fn load_from_durable(&mut self, key: &str) -> Option<Vec<FileNode>> {
        let skey = storage_key(key);
        let value = match self.store.get(&skey) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) if e.is_storage_error() => {
                log::debug!("Discarding unreadable durable entry {skey}: {e}");
                self.discard(&skey);
                return None;
            }
            Err(e) => {
                log::warn!("Durable read of {skey} failed: {e}");
                return None;
            }
        };

        let tree: PersistedTree = match serde_json::from_value(value) {
            Ok(tree) => tree,
            Err(e) => {
                log::debug!("Discarding malformed durable entry {skey}: {e}");
                self.discard(&skey);
                return None;
            }
        };

        if self.is_expired(tree.timestamp) {
            log::debug!("Durable entry {skey} expired");
            self.discard(&skey);
            return None;
        }
        Some(tree.files)
    }

    fn discard(&mut self, storage_key: &str) {
        if let Err(e) = self.store.remove(storage_key) {
            log::warn!("Failed to remove durable entry {storage_key}: {e}");
        }
    }

    /// Fuzzy search within a fresh entry. Absent or expired keys yield nothing.
    pub fn search(&mut self, key: &str, query: &str, limit: usize) -> Vec<FileNode> {
        if self.evict_if_expired(key) {
            return Vec::new();
        }
        match self.memory.peek(key) {
            Some(index) => index.search(query, limit),
            None => Vec::new(),
        }
    }

    pub fn clear(&mut self, key: &str) {
        self.memory.pop(key);
        self.discard(&storage_key(key));
    }

    /// Drop every memory entry and every durable tree key.
    pub fn clear_all(&mut self) {
        self.memory.clear();
        match self.store.keys() {
            Ok(keys) => {
                for key in keys.iter().filter(|k| k.starts_with(TREE_KEY_PREFIX)) {
                    self.discard(key);
                }
            }
            Err(e) => log::warn!("Failed to list durable keys: {e}"),
        }
    }

    /// Cache keys currently mirrored in durable storage.
    pub fn durable_keys(&self) -> Vec<String> {
        match self.store.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(TREE_KEY_PREFIX).map(str::to_string))
                .collect(),
            Err(e) => {
                log::warn!("Failed to list durable keys: {e}");
                Vec::new()
            }
        }
    }

    /// Another process rewrote `storage_key`; forget the memory copy so the
    /// next read goes through durable storage. Last writer wins.
    pub fn handle_external_change(&mut self, storage_key: &str) {
        if let Some(key) = storage_key.strip_prefix(TREE_KEY_PREFIX) {
            if self.memory.pop(key).is_some() {
                log::debug!("Dropped {key} after external change");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::store::MemoryStore;
    use serde_json::json;

    const START: i64 = 1_700_000_000_000;

    fn files(n: usize) -> Vec<FileNode> {
        (0..n)
            .map(|i| FileNode::file(format!("src/file{i}.rs"), format!("{i}"), Some(10)))
            .collect()
    }

    fn cache_with(config: CacheConfig) -> (Rc<ManualClock>, RepositoryIndexCache<MemoryStore>) {
        let clock = Rc::new(ManualClock::new(START));
        let dyn_clock: Rc<dyn Clock> = clock.clone();
        (clock, RepositoryIndexCache::new(MemoryStore::new(), config, dyn_clock))
    }

    fn cache() -> (Rc<ManualClock>, RepositoryIndexCache<MemoryStore>) {
        cache_with(CacheConfig::default())
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key("octo/repo", None), "octo/repo");
        assert_eq!(cache_key("octo/repo", Some("")), "octo/repo");
        assert_eq!(cache_key("octo/repo", Some("dev")), "octo/repo:dev");
        assert_eq!(storage_key("octo/repo:dev"), "tree_octo/repo:dev");
    }

    #[test]
    fn test_set_then_get() {
        let (_clock, mut cache) = cache();
        cache.set("a", files(3));
        let entry = cache.get("a").unwrap();
        assert_eq!(entry.len(), 3);
        assert_eq!(entry.cache_key(), "a");
    }

    #[test]
    fn test_get_expired_entry_is_evicted() {
        let (clock, mut cache) = cache();
        cache.set("a", files(1));
        clock.advance(300_000);
        assert!(cache.get("a").is_some());
        clock.advance(1);
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction_order() {
        let (_clock, mut cache) = cache_with(CacheConfig {
            max_entries: 2,
            ..Default::default()
        });
        cache.set("A", files(1));
        cache.set("B", files(1));
        cache.set("C", files(1));
        assert!(!cache.contains("A"));
        assert!(cache.contains("B"));
        assert!(cache.contains("C"));
    }

    #[test]
    fn test_get_promotes_entry() {
        let (_clock, mut cache) = cache_with(CacheConfig {
            max_entries: 2,
            ..Default::default()
        });
        cache.set("A", files(1));
        cache.set("B", files(1));
        assert!(cache.get("A").is_some());
        cache.set("C", files(1));
        assert!(cache.contains("A"));
        assert!(!cache.contains("B"));
        assert!(cache.contains("C"));
    }

    #[test]
    fn test_replacing_existing_key_does_not_evict() {
        let (_clock, mut cache) = cache_with(CacheConfig {
            max_entries: 2,
            ..Default::default()
        });
        cache.set("A", files(1));
        cache.set("B", files(1));
        cache.set("A", files(5));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("A").unwrap().len(), 5);
        assert!(cache.contains("B"));
    }

    #[test]
    fn test_durable_round_trip_truncates() {
        let (_clock, mut cache) = cache();
        cache.set("big", files(1500));
        let loaded = cache.load_from_durable("big").unwrap();
        assert_eq!(loaded.len(), 1000);
        assert_eq!(loaded[..], files(1500)[..1000]);
    }

    #[test]
    fn test_large_trees_stay_memory_only() {
        let (_clock, mut cache) = cache();
        cache.set("huge", files(5000));
        assert!(cache.get("huge").is_some());
        assert!(cache.load_from_durable("huge").is_none());
        assert!(cache.store().is_empty());
    }

    #[test]
    fn test_durable_expiry_removes_entry() {
        let (clock, mut cache) = cache();
        cache.set("a", files(2));
        clock.advance(300_001);
        assert!(cache.load_from_durable("a").is_none());
        assert!(cache.store().is_empty());
    }

    #[test]
    fn test_corrupt_durable_payload_is_a_miss() {
        let (_clock, mut cache) = cache();
        cache
            .store_mut()
            .set("tree_bad", &json!({"files": "nope", "timestamp": START}))
            .unwrap();
        assert!(cache.load_from_durable("bad").is_none());
        assert!(cache.store().is_empty());
    }

    #[test]
    fn test_durable_pruning_keeps_newest_ten() {
        let (clock, mut cache) = cache();
        for i in 0..11 {
            cache.set(&format!("repo{i}"), files(1));
            clock.advance(10);
        }
        let keys = cache.durable_keys();
        assert_eq!(keys.len(), 10);
        assert!(!keys.contains(&"repo0".to_string()));
        assert!(keys.contains(&"repo10".to_string()));
    }

    #[test]
    fn test_quota_exceeded_keeps_memory_entry() {
        let clock: Rc<dyn Clock> = Rc::new(ManualClock::new(START));
        let mut cache =
            RepositoryIndexCache::new(MemoryStore::with_quota(0), CacheConfig::default(), clock);
        cache.set("a", files(2));
        assert!(cache.get("a").is_some());
        assert!(cache.load_from_durable("a").is_none());
    }

    /// Fails every read with an I/O error that says nothing about the entry.
    struct UnreachableStore(MemoryStore);

    impl DurableStore for UnreachableStore {
        fn get(&self, _key: &str) -> crate::core::error::Result<Option<serde_json::Value>> {
            Err(std::io::Error::other("device unavailable").into())
        }
        fn set(&mut self, key: &str, value: &serde_json::Value) -> crate::core::error::Result<()> {
            self.0.set(key, value)
        }
        fn remove(&mut self, key: &str) -> crate::core::error::Result<()> {
            self.0.remove(key)
        }
        fn keys(&self) -> crate::core::error::Result<Vec<String>> {
            self.0.keys()
        }
    }

    #[test]
    fn test_unreachable_store_keeps_durable_entry() {
        let clock: Rc<dyn Clock> = Rc::new(ManualClock::new(START));
        let mut cache = RepositoryIndexCache::new(
            UnreachableStore(MemoryStore::new()),
            CacheConfig::default(),
            clock,
        );
        cache.set("a", files(2));
        assert!(cache.load_from_durable("a").is_none());
        assert_eq!(cache.durable_keys(), vec!["a".to_string()]);
    }

    #[test]
    fn test_search_absent_and_expired() {
        let (clock, mut cache) = cache();
        assert!(cache.search("missing", "x", 100).is_empty());
        cache.set("a", files(3));
        assert_eq!(cache.search("a", "file1", 100)[0].path, "src/file1.rs");
        clock.advance(300_001);
        assert!(cache.search("a", "file1", 100).is_empty());
    }

    #[test]
    fn test_clear_and_clear_all() {
        let (_clock, mut cache) = cache();
        cache.set("a", files(1));
        cache.set("b", files(1));
        cache
            .store_mut()
            .set("repositories", &json!({"keep": true}))
            .unwrap();

        cache.clear("a");
        assert!(!cache.contains("a"));
        assert!(cache.load_from_durable("a").is_none());
        assert!(cache.contains("b"));

        cache.clear_all();
        assert!(cache.is_empty());
        assert!(cache.durable_keys().is_empty());
        assert_eq!(cache.store().len(), 1);
    }

    #[test]
    fn test_external_change_drops_memory_copy() {
        let (_clock, mut cache) = cache();
        cache.set("a", files(1));
        cache.handle_external_change("repositories");
        assert!(cache.contains("a"));
        cache.handle_external_change("tree_a");
        assert!(!cache.contains("a"));
        assert!(cache.load_from_durable("a").is_some());
    }
}
