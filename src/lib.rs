//! git-mention - autocomplete for `@repo[:branch]/path` mentions.
//!
//! The library turns partially typed mentions into dropdown results: it parses
//! the mention, lists repositories and branches, and browses or fuzzy-searches
//! repository trees kept in a memory LRU backed by durable JSON storage.
//!
//! # Public API
//! The main public interface is re-exported from the [`core`] module, which provides:
//! - Mention parsing and fuzzy tree search
//! - The repository index cache and its durable stores
//! - The autocomplete state machine and a synchronous session driver
//! - A `git2` backed provider for local repositories

pub mod commands;
pub mod core;

pub use core::{
    AutocompleteController,
    Branch,
    DurableStore,
    Effect,
    FileNode,
    FileStore,
    Key,
    LocalGitProvider,
    MemoryStore,
    MentionError,
    MentionParser,
    MentionQuery,
    Mode,
    Repository,
    RepositoryIndexCache,
    Result,
    Results,
    Selection,
    Session,
    TreeIndex,
    TreeProvider,
};
