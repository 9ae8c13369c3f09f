//! Scripted provider and ready-made sessions.

#![allow(dead_code)]

use git_mention::core::cache::cache_key;
use git_mention::core::clock::{Clock, ManualClock};
use git_mention::core::config::CacheConfig;
use git_mention::core::error::{MentionError, Result};
use git_mention::core::folder::get_items_for_path;
use git_mention::core::{
    AutocompleteController, Branch, FileNode, MemoryStore, Repository, RepositoryIndexCache,
    Session, TreeProvider,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub const START_MS: i64 = 1_700_000_000_000;

/// In-memory provider that records every call.
#[derive(Default)]
pub struct ScriptedProvider {
    pub repositories: Vec<Repository>,
    /// Keyed by `owner/repo:branch`.
    pub trees: HashMap<String, Vec<FileNode>>,
    pub branches: HashMap<String, Vec<Branch>>,
    pub fail_tree: bool,
    pub fail_folder: bool,
    pub calls: RefCell<Vec<String>>,
}

impl ScriptedProvider {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn tree(&self, owner: &str, repo: &str, branch: &str) -> Result<&Vec<FileNode>> {
        let full_name = format!("{owner}/{repo}");
        self.trees
            .get(&cache_key(&full_name, Some(branch)))
            .ok_or_else(|| MentionError::branch_not_found(full_name, branch))
    }
}

impl TreeProvider for ScriptedProvider {
    fn list_repositories(&self) -> Result<Vec<Repository>> {
        self.record("list".to_string());
        Ok(self.repositories.clone())
    }

    fn fetch_tree(&self, owner: &str, repo: &str, branch: &str) -> Result<Vec<FileNode>> {
        self.record(format!("tree {owner}/{repo}:{branch}"));
        if self.fail_tree {
            return Err(MentionError::fetch_failed("tree", "rate limited"));
        }
        self.tree(owner, repo, branch).cloned()
    }

    fn fetch_branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>> {
        self.record(format!("branches {owner}/{repo}"));
        Ok(self
            .branches
            .get(&format!("{owner}/{repo}"))
            .cloned()
            .unwrap_or_default())
    }

    fn fetch_folder(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Vec<FileNode>> {
        self.record(format!("folder {owner}/{repo}:{branch} '{path}'"));
        if self.fail_folder {
            return Err(MentionError::fetch_failed("folder", "offline"));
        }
        Ok(get_items_for_path(self.tree(owner, repo, branch)?, path))
    }

    fn identity(&self) -> String {
        "scripted-token".to_string()
    }
}

pub fn files(paths: &[&str]) -> Vec<FileNode> {
    paths
        .iter()
        .map(|p| FileNode::file(*p, format!("sha-{p}"), Some(p.len() as u64)))
        .collect()
}

/// Two repositories; `octo/app` has `main` and `dev` trees.
pub fn scripted_provider() -> ScriptedProvider {
    let mut provider = ScriptedProvider {
        repositories: vec![
            Repository::new("octo/app", "main"),
            Repository::new("octo/docs", "main"),
        ],
        ..Default::default()
    };
    provider.trees.insert(
        "octo/app:main".to_string(),
        files(&[
            "README.md",
            "src/main.rs",
            "src/button.rs",
            "src/ui/modal.rs",
            "tests/ui_tests.rs",
        ]),
    );
    provider.trees.insert(
        "octo/app:dev".to_string(),
        files(&["README.md", "src/main.rs", "src/experimental.rs"]),
    );
    provider.branches.insert(
        "octo/app".to_string(),
        vec![Branch::new("dev", "d1"), Branch::new("main", "m1")],
    );
    provider
}

pub fn manual_clock() -> Rc<ManualClock> {
    Rc::new(ManualClock::new(START_MS))
}

pub fn session_with(
    provider: ScriptedProvider,
    store: MemoryStore,
    clock: &Rc<ManualClock>,
) -> Session<ScriptedProvider, MemoryStore> {
    let dyn_clock: Rc<dyn Clock> = clock.clone();
    let cache = RepositoryIndexCache::new(store, CacheConfig::default(), dyn_clock);
    Session::new(provider, AutocompleteController::new(cache))
}
