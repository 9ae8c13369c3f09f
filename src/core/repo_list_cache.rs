//! Durable cache of the user's repository list.
//!
//! The list is stored under a single key together with the write time and a
//! fingerprint of the access token it was fetched with. A different token, an
//! expired timestamp or an unreadable payload all clear the entry.

use crate::core::clock::Clock;
use crate::core::model::Repository;
use crate::core::store::DurableStore;
use serde::{Deserialize, Serialize};

pub const REPOSITORY_LIST_KEY: &str = "repositories";

#[derive(Debug, Serialize, Deserialize)]
struct CachedRepositoryList {
    repositories: Vec<Repository>,
    timestamp: i64,
    /// MD5 fingerprint of the token, never the token itself.
    token: String,
}

fn fingerprint(token: &str) -> String {
    format!("{:x}", md5::compute(token.as_bytes()))
}

pub struct RepositoryListCache<'a, S: DurableStore> {
    store: &'a mut S,
    clock: &'a dyn Clock,
    max_age_ms: i64,
}

impl<'a, S: DurableStore> RepositoryListCache<'a, S> {
    pub fn new(store: &'a mut S, clock: &'a dyn Clock, max_age_ms: i64) -> Self {
        Self {
            store,
            clock,
            max_age_ms,
        }
    }

    fn read(&self) -> Option<CachedRepositoryList> {
        let value = self.store.get(REPOSITORY_LIST_KEY).ok()??;
        serde_json::from_value(value).ok()
    }

    pub fn get(&mut self, token: &str) -> Option<Vec<Repository>> {
        let present = matches!(self.store.get(REPOSITORY_LIST_KEY), Ok(Some(_)));
        let Some(cached) = self.read() else {
            if present {
                log::debug!("Discarding unreadable repository list cache");
                self.clear();
            }
            return None;
        };

        if cached.token != fingerprint(token) {
            log::debug!("Repository list cached for another token");
            self.clear();
            return None;
        }
        if self.clock.now_ms() - cached.timestamp > self.max_age_ms {
            log::debug!("Repository list cache expired");
            self.clear();
            return None;
        }
        Some(cached.repositories)
    }

    pub fn set(&mut self, repositories: &[Repository], token: &str) {
        let data = CachedRepositoryList {
            repositories: repositories.to_vec(),
            timestamp: self.clock.now_ms(),
            token: fingerprint(token),
        };
        let value = match serde_json::to_value(&data) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to serialize repository list: {e}");
                return;
            }
        };

        if let Err(e) = self.store.set(REPOSITORY_LIST_KEY, &value) {
            log::warn!("Error caching repositories: {e}");
            self.clear();
            if let Err(e) = self.store.set(REPOSITORY_LIST_KEY, &value) {
                log::warn!("Failed to cache repositories after cleanup: {e}");
            }
        }
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.store.remove(REPOSITORY_LIST_KEY) {
            log::warn!("Error clearing repository cache: {e}");
        }
    }

    pub fn has_valid_cache(&mut self, token: &str) -> bool {
        self.get(token).is_some()
    }

    /// Age of the cached list in ms, if it belongs to `token`.
    pub fn cache_age(&self, token: &str) -> Option<i64> {
        let cached = self.read()?;
        (cached.token == fingerprint(token)).then(|| self.clock.now_ms() - cached.timestamp)
    }
}
