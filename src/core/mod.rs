//! Core functionality for git-mention.
//!
//! This module provides the building blocks behind the mention dropdown:
//! parsing, fuzzy search, the two-tier tree cache, the autocomplete state
//! machine and the local git provider.

pub mod autocomplete;
pub mod cache;
pub mod clock;
pub mod command_init;
pub mod config;
pub mod dirs;
pub mod error;
pub mod folder;
pub mod fuzzy;
pub mod git;
pub mod language;
pub mod mention_parser;
pub mod model;
pub mod output;
pub mod provider;
pub mod repo_list_cache;
pub mod session;
pub mod store;
pub mod timer;
pub mod tree_index;

// === Error handling ===
pub use error::{MentionError, Result};

// === Data model ===
pub use model::{sort_branches, sort_repositories, Branch, FileNode, NodeKind, Repository};

// === Parsing and search ===
// "see @repo:dev/src/ma" -> prefix, repo, branch, folder and fragment
pub use mention_parser::{MentionParser, MentionQuery};
pub use tree_index::TreeIndex;

// === Caching ===
pub use cache::RepositoryIndexCache;
pub use repo_list_cache::RepositoryListCache;
pub use store::{DurableStore, FileStore, MemoryStore};

// === Autocomplete ===
pub use autocomplete::{AutocompleteController, Effect, FetchRequest, Key, Mode, Results, Selection};
pub use session::Session;

// === Providers ===
pub use git::LocalGitProvider;
pub use provider::TreeProvider;

// === Output formatting ===
pub use output::{print_error, print_info, print_section_header, print_success};
