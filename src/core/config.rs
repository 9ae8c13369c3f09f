use crate::core::dirs::get_config_directory;
use crate::core::error::MentionError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Limits of the repository index cache and the autocomplete controller.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Trees kept in memory before LRU eviction.
    pub max_entries: usize,
    /// Age after which a tree is treated as absent.
    pub max_age_ms: i64,
    /// Tree keys retained in durable storage.
    pub durable_max_keys: usize,
    /// Files written per durable tree entry.
    pub durable_max_files: usize,
    /// Trees with this many files or more stay memory-only.
    pub persist_threshold: usize,
    pub search_limit: usize,
    /// Maximum edit ratio accepted by the fuzzy matcher.
    pub fuzzy_threshold: f64,
    pub debounce_ms: i64,
    pub repository_list_max_age_ms: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 50,
            max_age_ms: 5 * 60 * 1000,
            durable_max_keys: 10,
            durable_max_files: 1000,
            persist_threshold: 5000,
            search_limit: 100,
            fuzzy_threshold: 0.3,
            debounce_ms: 100,
            repository_list_max_age_ms: 30 * 60 * 1000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directories scanned for git repositories by the local provider.
    pub repository_roots: Vec<PathBuf>,
    pub cache: CacheConfig,
}

impl Config {
    pub fn load_or_create() -> Result<Self, MentionError> {
        let config_file = get_config_directory()?.join("config.json");
        Self::load_or_create_at(&config_file)
    }

    pub fn load_or_create_at(config_file: &Path) -> Result<Self, MentionError> {
        if config_file.exists() {
            let content = std::fs::read_to_string(config_file)?;
            log::debug!("Loaded config from {}", config_file.display());
            Ok(serde_json::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_at(config_file)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<(), MentionError> {
        let config_file = get_config_directory()?.join("config.json");
        self.save_at(&config_file)
    }

    pub fn save_at(&self, config_file: &Path) -> Result<(), MentionError> {
        if let Some(dir) = config_file.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_file, content)?;
        Ok(())
    }

    /// Replace the configured roots when roots were given on the command line.
    pub fn with_roots(mut self, roots: Vec<PathBuf>) -> Self {
        if !roots.is_empty() {
            self.repository_roots = roots;
        }
        self
    }
}
