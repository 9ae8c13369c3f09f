//! One repository+branch snapshot with its fuzzy-search index.
//!
//! The index is built once in [`TreeIndex::build`] and never mutated; a new
//! file list always means a new `TreeIndex`.

use crate::core::fuzzy::{FuzzyKey, FuzzyPattern};
use crate::core::model::FileNode;
use std::cmp::Ordering;
use std::sync::Arc;

/// Upper bound on results returned by a single search.
pub const DEFAULT_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Clone)]
struct IndexedFile {
    name: FuzzyKey,
    path: FuzzyKey,
}

#[derive(Debug, Clone)]
pub struct TreeIndex {
    cache_key: String,
    files: Arc<[FileNode]>,
    created_at_ms: i64,
    threshold: f64,
    keys: Vec<IndexedFile>,
}

impl TreeIndex {
    pub fn build(
        cache_key: impl Into<String>,
        files: Vec<FileNode>,
        created_at_ms: i64,
        threshold: f64,
    ) -> Self {
        let keys = files
            .iter()
            .map(|f| IndexedFile {
                name: FuzzyKey::new(&f.name),
                path: FuzzyKey::new(&f.path),
            })
            .collect();

        Self {
            cache_key: cache_key.into(),
            files: files.into(),
            created_at_ms,
            threshold,
            keys,
        }
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn files(&self) -> &[FileNode] {
        &self.files
    }

    /// Cheap shared handle on the file list.
    pub fn shared_files(&self) -> Arc<[FileNode]> {
        Arc::clone(&self.files)
    }

    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Rank files against `query`, best first.
    ///
    /// A blank query returns the first `limit` files in their original order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<FileNode> {
        let pattern = FuzzyPattern::new(query, self.threshold);
        if pattern.is_empty() {
            return self.files.iter().take(limit).cloned().collect();
        }

        let mut scored: Vec<(f64, usize)> = self
            .keys
            .iter()
            .enumerate()
            .filter_map(|(idx, key)| {
                pattern
                    .score_keys([&key.name, &key.path])
                    .map(|score| (score, idx))
            })
            .collect();

        // equal scores keep their position in the tree
        scored.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });

        log::debug!(
            "search '{}' in {}: {} matches (limit {})",
            query,
            self.cache_key,
            scored.len(),
            limit
        );

        scored
            .into_iter()
            .take(limit)
            .map(|(_, idx)| self.files[idx].clone())
            .collect()
    }
}
