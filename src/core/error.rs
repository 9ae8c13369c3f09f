//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`MentionError`] which covers every failure mode of the
//! repository index cache, the tree providers and the CLI. It uses `thiserror`
//! for ergonomic error definitions and includes constructors for the common
//! failure scenarios.
//!
//! # Public API
//! - [`MentionError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, MentionError>`
//!
//! # Error Categories
//! - **Provider operations**: repository/branch lookup and tree fetch failures
//! - **Storage operations**: quota, read, write and parse failures of durable storage
//! - **Configuration**: missing config directory, no repositories configured
//!
//! Only provider failures are meant to reach the user. Storage errors are
//! absorbed by the cache layers and turned into cache misses.

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for git-mention
#[derive(Error, Debug)]
pub enum MentionError {
    // Provider errors
    #[error("Repository not found: {name}")]
    RepositoryNotFound { name: String },

    #[error("Branch '{branch}' not found in {repository}")]
    BranchNotFound { repository: String, branch: String },

    #[error("Failed to fetch {what}: {message}")]
    FetchFailed { what: String, message: String },

    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("Invalid UTF-8 path in repository")]
    InvalidUtf8Path,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Storage errors
    #[error("Storage quota exceeded while writing '{key}'")]
    StorageQuotaExceeded { key: String },

    #[error("Could not find cache directory")]
    CacheDirectoryNotFound,

    #[error("Failed to create cache directory '{path}': {source}")]
    CacheDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write cache file '{path}': {source}")]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read cache file '{path}': {source}")]
    CacheReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse cache file '{path}': {source}")]
    CacheParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    // Configuration errors
    #[error("Could not find config directory")]
    ConfigDirectoryNotFound,

    #[error("No repositories configured. Pass --root <dir> or add repository_roots to config.json")]
    NoRepositoriesConfigured,

    // JSON serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using MentionError
pub type Result<T> = std::result::Result<T, MentionError>;

impl MentionError {
    /// Create a repository not found error
    pub fn repository_not_found(name: impl Into<String>) -> Self {
        Self::RepositoryNotFound { name: name.into() }
    }

    /// Create a branch not found error
    pub fn branch_not_found(repository: impl Into<String>, branch: impl Into<String>) -> Self {
        Self::BranchNotFound {
            repository: repository.into(),
            branch: branch.into(),
        }
    }

    /// Create a fetch failure for the given resource description
    pub fn fetch_failed(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a storage quota exceeded error
    pub fn storage_quota_exceeded(key: impl Into<String>) -> Self {
        Self::StorageQuotaExceeded { key: key.into() }
    }

    /// Create a cache directory creation failed error
    pub fn cache_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::CacheDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache write failed error
    pub fn cache_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache read failed error
    pub fn cache_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache parse failed error
    pub fn cache_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CacheParseFailed {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from durable storage rather than a provider
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::StorageQuotaExceeded { .. }
                | Self::CacheDirectoryNotFound
                | Self::CacheDirectoryCreationFailed { .. }
                | Self::CacheWriteFailed { .. }
                | Self::CacheReadFailed { .. }
                | Self::CacheParseFailed { .. }
        )
    }
}
