//! Platform directories for configuration and the durable tree store.

use crate::core::error::{MentionError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "git-mention";

pub fn get_config_directory() -> Result<PathBuf> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config"))),
        "macos" => dirs::home_dir().map(|h| h.join("Library/Application Support")),
        _ => dirs::config_dir(),
    };

    base.map(|b| b.join(APP_DIR))
        .ok_or(MentionError::ConfigDirectoryNotFound)
}

pub fn get_cache_directory() -> Result<PathBuf> {
    // XDG_CACHE_HOME wins everywhere so tests can isolate the store
    let base = std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(|| match std::env::consts::OS {
            "linux" | "freebsd" | "netbsd" | "openbsd" => {
                dirs::home_dir().map(|h| h.join(".cache"))
            }
            "macos" => dirs::home_dir().map(|h| h.join("Library/Caches")),
            _ => dirs::cache_dir(),
        });

    base.map(|b| b.join(APP_DIR))
        .ok_or(MentionError::CacheDirectoryNotFound)
}

/// Directory holding one JSON file per durable key.
pub fn get_store_directory() -> Result<PathBuf> {
    Ok(get_cache_directory()?.join("store"))
}
