//! State machine behind the mention dropdown.
//!
//! [`AutocompleteController`] owns the input text, the dropdown mode and the
//! current results. It never talks to a provider directly: handlers return
//! [`Effect`]s, the caller performs the fetches and reports back through the
//! `complete_*` methods. Searches are debounced through a [`Debouncer`] that
//! the caller drives with [`AutocompleteController::tick`].
//!
//! # Modes
//! - **RepositorySelect**: repositories filtered by the typed name
//! - **BranchSelect**: branches of the selected repository, default first
//! - **FileBrowse**: folder listing, or fuzzy hits when a fragment is typed
//!
//! # Loading
//! Repository selection reads the memory tier, then durable storage, and only
//! then asks for a tree fetch. A failed tree fetch falls back to one folder at
//! a time; those partial trees are never cached. Concurrent fetches for the
//! same cache key are coalesced, and a late result is still cached even when
//! the dropdown has moved on.

use crate::core::cache::{cache_key, RepositoryIndexCache};
use crate::core::clock::Clock;
use crate::core::error::Result;
use crate::core::folder::{get_items_for_path, parent_path};
use crate::core::mention_parser::{MentionParser, MentionQuery, TRIGGER};
use crate::core::model::{sort_branches, sort_repositories, Branch, FileNode, Repository};
use crate::core::store::DurableStore;
use crate::core::timer::Debouncer;
use crate::core::tree_index::TreeIndex;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    RepositorySelect,
    BranchSelect,
    FileBrowse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Results {
    Repositories(Vec<Repository>),
    Branches(Vec<Branch>),
    Files(Vec<FileNode>),
}

impl Results {
    pub fn len(&self) -> usize {
        match self {
            Self::Repositories(repos) => repos.len(),
            Self::Branches(branches) => branches.len(),
            Self::Files(files) => files.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Cache key the result belongs to.
    pub key: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub repository: Repository,
    pub branch: String,
    pub file: FileNode,
}

impl Selection {
    /// Fully qualified mention, e.g. `@alpha:main/src/lib.rs`.
    pub fn mention(&self) -> String {
        format!(
            "{TRIGGER}{}:{}/{}",
            self.repository.name, self.branch, self.file.path
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchTree(FetchRequest),
    FetchFolder { request: FetchRequest, path: String },
    FetchBranches(Repository),
    Commit(Selection),
}

/// The dropdown is visible for blank input, for any input containing the
/// trigger, and whenever a repository has been selected.
pub fn should_show_dropdown(input: &str, mode: Mode) -> bool {
    input.trim().is_empty() || input.contains(TRIGGER) || mode != Mode::RepositorySelect
}

struct TreeSnapshot {
    files: Arc<[FileNode]>,
    partial: bool,
    loaded_folders: HashSet<String>,
}

impl TreeSnapshot {
    fn complete(files: Arc<[FileNode]>) -> Self {
        Self {
            files,
            partial: false,
            loaded_folders: HashSet::new(),
        }
    }

    fn partial() -> Self {
        Self {
            files: Arc::from(Vec::new()),
            partial: true,
            loaded_folders: HashSet::new(),
        }
    }

    fn merge(mut self, folder: &str, nodes: Vec<FileNode>) -> Self {
        let known: HashSet<&str> = self.files.iter().map(|f| f.path.as_str()).collect();
        let fresh: Vec<FileNode> = nodes
            .into_iter()
            .filter(|n| !known.contains(n.path.as_str()))
            .collect();
        let mut files = self.files.to_vec();
        files.extend(fresh);
        self.files = files.into();
        self.loaded_folders.insert(folder.to_string());
        self
    }
}

pub struct AutocompleteController<S: DurableStore> {
    cache: RepositoryIndexCache<S>,
    clock: Rc<dyn Clock>,
    debounce: Debouncer<String>,
    repositories: Vec<Repository>,

    input: String,
    query: MentionQuery,
    mode: Mode,
    open: bool,
    selected_index: usize,
    results: Results,

    selected_repo: Option<Repository>,
    /// Explicit branch; `None` browses the default branch.
    branch: Option<String>,
    branches: Vec<Branch>,
    current_folder: String,
    tree: Option<TreeSnapshot>,

    is_loading_tree: bool,
    is_loading_branches: bool,
    is_searching: bool,
    error: Option<String>,

    trees_in_flight: HashSet<String>,
    folders_in_flight: HashSet<(String, String)>,
    branches_in_flight: HashSet<String>,
}

impl<S: DurableStore> AutocompleteController<S> {
    pub fn new(cache: RepositoryIndexCache<S>) -> Self {
        let clock = cache.clock().clone();
        let debounce = Debouncer::new(cache.config().debounce_ms);
        Self {
            cache,
            clock,
            debounce,
            repositories: Vec::new(),
            input: String::new(),
            query: MentionQuery::default(),
            mode: Mode::RepositorySelect,
            open: true,
            selected_index: 0,
            results: Results::Repositories(Vec::new()),
            selected_repo: None,
            branch: None,
            branches: Vec::new(),
            current_folder: String::new(),
            tree: None,
            is_loading_tree: false,
            is_loading_branches: false,
            is_searching: false,
            error: None,
            trees_in_flight: HashSet::new(),
            folders_in_flight: HashSet::new(),
            branches_in_flight: HashSet::new(),
        }
    }

    pub fn cache(&self) -> &RepositoryIndexCache<S> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut RepositoryIndexCache<S> {
        &mut self.cache
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn query(&self) -> &MentionQuery {
        &self.query
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn results(&self) -> &Results {
        &self.results
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn selected_repository(&self) -> Option<&Repository> {
        self.selected_repo.as_ref()
    }

    /// Branch being browsed, explicit or default.
    pub fn branch(&self) -> Option<&str> {
        match (&self.branch, &self.selected_repo) {
            (Some(branch), _) => Some(branch),
            (None, Some(repo)) if self.mode == Mode::FileBrowse => Some(&repo.default_branch),
            _ => None,
        }
    }

    pub fn current_folder(&self) -> &str {
        &self.current_folder
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading_tree || self.is_loading_branches
    }

    pub fn is_loading_tree(&self) -> bool {
        self.is_loading_tree
    }

    pub fn is_loading_branches(&self) -> bool {
        self.is_loading_branches
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    /// Whether the browsed tree came from the folder-by-folder fallback.
    pub fn is_partial_tree(&self) -> bool {
        self.tree.as_ref().is_some_and(|t| t.partial)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_repositories(&mut self, mut repositories: Vec<Repository>) {
        sort_repositories(&mut repositories);
        self.repositories = repositories;
        if self.mode == Mode::RepositorySelect {
            self.filter_repositories();
        }
    }

    /// Replace the input text. Any pending search is dropped.
    pub fn set_input(&mut self, text: &str) -> Vec<Effect> {
        self.replace_input(text.to_string());
        self.debounce.cancel();
        self.is_searching = false;

        if self.mode != Mode::RepositorySelect && !self.query_matches_selection() {
            log::debug!("Mention no longer matches the selection, back to repositories");
            self.reset_to_repository_select();
        }

        let effects = match self.mode {
            Mode::RepositorySelect => self.sync_repository_select(),
            Mode::BranchSelect => self.sync_branch_select(),
            Mode::FileBrowse => self.sync_file_browse(),
        };
        self.open = should_show_dropdown(&self.input, self.mode);
        effects
    }

    pub fn handle_key(&mut self, key: Key) -> Vec<Effect> {
        match key {
            Key::Up => {
                self.move_selection(false);
                Vec::new()
            }
            Key::Down => {
                self.move_selection(true);
                Vec::new()
            }
            Key::Enter => {
                if !self.open || self.results.is_empty() {
                    return Vec::new();
                }
                self.select(self.selected_index)
            }
            Key::Escape => self.escape(),
        }
    }

    /// Pick the result at `index`, as a click would.
    pub fn select(&mut self, index: usize) -> Vec<Effect> {
        if index >= self.results.len() {
            return Vec::new();
        }
        self.selected_index = index;
        match &self.results {
            Results::Repositories(repos) => {
                let repo = repos[index].clone();
                self.choose_repository(repo)
            }
            Results::Branches(branches) => {
                let name = branches[index].name.clone();
                self.choose_branch(name)
            }
            Results::Files(files) => {
                let node = files[index].clone();
                self.choose_file(node)
            }
        }
    }

    /// Run the debounced search if its delay has elapsed.
    pub fn tick(&mut self) -> bool {
        match self.debounce.poll(self.clock.now_ms()) {
            Some(fragment) => {
                self.run_search(&fragment);
                true
            }
            None => false,
        }
    }

    /// Run the pending search now.
    pub fn flush_search(&mut self) -> bool {
        match self.debounce.flush() {
            Some(fragment) => {
                self.run_search(&fragment);
                true
            }
            None => false,
        }
    }

    pub fn complete_tree_fetch(
        &mut self,
        request: &FetchRequest,
        result: Result<Vec<FileNode>>,
    ) -> Vec<Effect> {
        self.trees_in_flight.remove(&request.key);
        match result {
            Ok(files) => {
                log::debug!("Fetched {} entries for {}", files.len(), request.key);
                self.cache.set(&request.key, files);
                if !self.is_active(&request.key) {
                    return Vec::new();
                }
                self.is_loading_tree = false;
                if let Some(index) = self.cache.get(&request.key) {
                    self.tree = Some(TreeSnapshot::complete(index.shared_files()));
                }
                self.sync_file_browse()
            }
            Err(e) => {
                log::warn!("Tree fetch failed for {}: {e}", request.key);
                if !self.is_active(&request.key) {
                    return Vec::new();
                }
                self.request_folder(request.clone(), String::new())
            }
        }
    }

    pub fn complete_folder_fetch(
        &mut self,
        request: &FetchRequest,
        path: &str,
        result: Result<Vec<FileNode>>,
    ) -> Vec<Effect> {
        self.folders_in_flight
            .remove(&(request.key.clone(), path.to_string()));
        if !self.is_active(&request.key) || self.tree.as_ref().is_some_and(|t| !t.partial) {
            log::debug!("Dropping folder '{path}' of {}", request.key);
            return Vec::new();
        }

        self.is_loading_tree = false;
        match result {
            Ok(nodes) => {
                log::debug!("Loaded folder '{path}' of {}", request.key);
                let tree = self.tree.take().unwrap_or_else(TreeSnapshot::partial);
                self.tree = Some(tree.merge(path, nodes));
                self.error = None;
                self.sync_file_browse()
            }
            Err(e) => {
                log::warn!("Folder fetch failed for {}: {e}", request.key);
                self.error = Some(format!("Failed to load repository files: {e}"));
                self.set_results(Results::Files(Vec::new()));
                Vec::new()
            }
        }
    }

    pub fn complete_branch_fetch(
        &mut self,
        repository: &Repository,
        result: Result<Vec<Branch>>,
    ) -> Vec<Effect> {
        self.branches_in_flight.remove(&repository.full_name);
        let active = self.mode == Mode::BranchSelect
            && self
                .selected_repo
                .as_ref()
                .is_some_and(|r| r.full_name == repository.full_name);
        if !active {
            return Vec::new();
        }

        self.is_loading_branches = false;
        match result {
            Ok(mut branches) => {
                sort_branches(&mut branches, &repository.default_branch);
                self.branches = branches;
                self.sync_branch_select()
            }
            Err(e) => {
                log::warn!("Branch fetch failed for {}: {e}", repository.full_name);
                self.error = Some(format!("Failed to load branches: {e}"));
                self.set_results(Results::Branches(Vec::new()));
                Vec::new()
            }
        }
    }

    fn replace_input(&mut self, text: String) {
        self.query = MentionParser::parse(&text);
        self.input = text;
    }

    fn set_results(&mut self, results: Results) {
        self.results = results;
        self.selected_index = 0;
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.results.len();
        if len == 0 {
            return;
        }
        self.selected_index = if down {
            (self.selected_index + 1) % len
        } else {
            (self.selected_index + len - 1) % len
        };
    }

    fn active_key(&self) -> Option<String> {
        let repo = self.selected_repo.as_ref()?;
        Some(cache_key(&repo.full_name, self.branch.as_deref()))
    }

    fn is_active(&self, key: &str) -> bool {
        self.mode == Mode::FileBrowse && self.active_key().as_deref() == Some(key)
    }

    fn fetch_request(&self, repo: &Repository, key: String) -> FetchRequest {
        FetchRequest {
            key,
            owner: repo.owner().to_string(),
            repo: repo.name.clone(),
            branch: self
                .branch
                .clone()
                .unwrap_or_else(|| repo.default_branch.clone()),
        }
    }

    fn query_matches_selection(&self) -> bool {
        let Some(repo) = &self.selected_repo else {
            return false;
        };
        if !self.query.has_trigger || !self.query.repo_name.eq_ignore_ascii_case(&repo.name) {
            return false;
        }
        match self.mode {
            Mode::RepositorySelect => true,
            Mode::BranchSelect => self.query.has_branch_marker,
            Mode::FileBrowse => match &self.branch {
                Some(branch) => {
                    self.query.has_branch_marker
                        && self.query.has_path
                        && self.query.branch.eq_ignore_ascii_case(branch)
                }
                None => !self.query.has_branch_marker && self.query.has_path,
            },
        }
    }

    fn reset_to_repository_select(&mut self) {
        self.mode = Mode::RepositorySelect;
        self.selected_repo = None;
        self.branch = None;
        self.branches.clear();
        self.tree = None;
        self.current_folder.clear();
        self.is_loading_tree = false;
        self.is_loading_branches = false;
        self.is_searching = false;
        self.error = None;
        self.debounce.cancel();
    }

    fn filter_repositories(&mut self) {
        let needle = self.query.repo_name.to_lowercase();
        let matches = self
            .repositories
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        self.set_results(Results::Repositories(matches));
    }

    fn sync_repository_select(&mut self) -> Vec<Effect> {
        self.filter_repositories();
        if !self.query.has_trigger || !(self.query.has_path || self.query.has_branch_marker) {
            return Vec::new();
        }
        let typed = self
            .repositories
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(&self.query.repo_name))
            .cloned();
        match typed {
            Some(repo) => self.select_repository(repo),
            None => Vec::new(),
        }
    }

    fn choose_repository(&mut self, repo: Repository) -> Vec<Effect> {
        let prefix = &self.query.text_before_trigger;
        let text = if self.query.has_branch_marker {
            format!("{prefix}{TRIGGER}{}:{}", repo.name, self.query.branch)
        } else {
            MentionParser::format(prefix, &repo.name, None, "")
        };
        self.replace_input(text);
        self.select_repository(repo)
    }

    fn select_repository(&mut self, repo: Repository) -> Vec<Effect> {
        log::debug!("Selected repository {}", repo.full_name);
        self.selected_repo = Some(repo.clone());
        self.branch = None;
        self.tree = None;
        self.error = None;

        if !self.query.has_branch_marker {
            return self.enter_file_browse(None);
        }

        self.mode = Mode::BranchSelect;
        self.branches.clear();
        self.set_results(Results::Branches(Vec::new()));
        self.is_loading_branches = true;
        if self.branches_in_flight.insert(repo.full_name.clone()) {
            vec![Effect::FetchBranches(repo)]
        } else {
            Vec::new()
        }
    }

    fn sync_branch_select(&mut self) -> Vec<Effect> {
        if self.is_loading_branches {
            return Vec::new();
        }
        let prefix = self.query.branch.to_lowercase();
        let matches = self
            .branches
            .iter()
            .filter(|b| b.name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        self.set_results(Results::Branches(matches));

        if !self.query.has_path {
            return Vec::new();
        }
        let typed = self
            .branches
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(&self.query.branch))
            .map(|b| b.name.clone());
        match typed {
            Some(name) => self.enter_file_browse(Some(name)),
            None => Vec::new(),
        }
    }

    fn choose_branch(&mut self, name: String) -> Vec<Effect> {
        let Some(repo) = &self.selected_repo else {
            return Vec::new();
        };
        let text = MentionParser::format(
            &self.query.text_before_trigger,
            &repo.name,
            Some(&name),
            "",
        );
        self.replace_input(text);
        self.enter_file_browse(Some(name))
    }

    fn enter_file_browse(&mut self, branch: Option<String>) -> Vec<Effect> {
        let Some(repo) = self.selected_repo.clone() else {
            return Vec::new();
        };
        self.mode = Mode::FileBrowse;
        self.branch = branch;
        self.tree = None;
        self.error = None;
        self.is_loading_tree = false;
        self.open = true;
        let key = cache_key(&repo.full_name, self.branch.as_deref());

        if let Some(index) = self.cache.get(&key) {
            log::debug!("Tree cache hit for {key}");
            self.tree = Some(TreeSnapshot::complete(index.shared_files()));
            return self.sync_file_browse();
        }
        if let Some(files) = self.cache.load_from_durable(&key) {
            log::debug!("Durable tree hit for {key}");
            self.cache.set(&key, files);
            if let Some(index) = self.cache.get(&key) {
                self.tree = Some(TreeSnapshot::complete(index.shared_files()));
                return self.sync_file_browse();
            }
        }

        self.is_loading_tree = true;
        self.current_folder = self.query.folder().to_string();
        self.set_results(Results::Files(Vec::new()));
        let request = self.fetch_request(&repo, key.clone());
        if self.trees_in_flight.insert(key.clone()) {
            log::debug!("Fetching tree for {key}");
            vec![Effect::FetchTree(request)]
        } else {
            log::debug!("Tree fetch for {key} already in flight");
            Vec::new()
        }
    }

    fn request_folder(&mut self, request: FetchRequest, path: String) -> Vec<Effect> {
        self.is_loading_tree = true;
        self.set_results(Results::Files(Vec::new()));
        if self
            .folders_in_flight
            .insert((request.key.clone(), path.clone()))
        {
            log::debug!("Fetching folder '{path}' of {}", request.key);
            vec![Effect::FetchFolder { request, path }]
        } else {
            Vec::new()
        }
    }

    fn sync_file_browse(&mut self) -> Vec<Effect> {
        self.current_folder = self.query.folder().to_string();
        if self.is_loading_tree {
            self.set_results(Results::Files(Vec::new()));
            return Vec::new();
        }

        let stale = self.tree.as_ref().is_some_and(|t| !t.partial)
            && self
                .active_key()
                .is_some_and(|key| !self.cache.contains(&key));
        if stale {
            log::debug!("Cached tree expired while browsing, reloading");
            return self.enter_file_browse(self.branch.clone());
        }

        let missing_folder = self
            .tree
            .as_ref()
            .is_some_and(|t| t.partial && !t.loaded_folders.contains(&self.current_folder));
        if missing_folder {
            if let (Some(repo), Some(key)) = (self.selected_repo.clone(), self.active_key()) {
                let request = self.fetch_request(&repo, key);
                return self.request_folder(request, self.current_folder.clone());
            }
        }

        match self.query.search_fragment() {
            None => {
                self.debounce.cancel();
                let items = self
                    .tree
                    .as_ref()
                    .map(|t| get_items_for_path(&t.files, &self.current_folder))
                    .unwrap_or_default();
                self.set_results(Results::Files(items));
            }
            Some(fragment) => {
                let fragment = fragment.to_string();
                self.debounce.schedule(self.clock.now_ms(), fragment);
                self.is_searching = true;
            }
        }
        Vec::new()
    }

    fn run_search(&mut self, fragment: &str) {
        self.is_searching = false;
        if self.mode != Mode::FileBrowse || self.is_loading_tree {
            return;
        }
        let Some(key) = self.active_key() else {
            return;
        };
        let limit = self.cache.config().search_limit;
        let indexed = self.cache.contains(&key);
        let hits = match &self.tree {
            // Partial trees are never cached; an entry that expired since the
            // keystroke is searched from the snapshot until the next reload.
            Some(tree) if tree.partial || !indexed => TreeIndex::build(
                key,
                tree.files.to_vec(),
                self.clock.now_ms(),
                self.cache.config().fuzzy_threshold,
            )
            .search(fragment, limit),
            _ => self.cache.search(&key, fragment, limit),
        };
        log::debug!("Search '{fragment}' returned {} hits", hits.len());
        self.set_results(Results::Files(hits));
    }

    fn choose_file(&mut self, node: FileNode) -> Vec<Effect> {
        if self.is_loading_tree {
            return Vec::new();
        }
        if node.is_dir() {
            return self.open_folder(node.path);
        }
        let Some(repository) = self.selected_repo.clone() else {
            return Vec::new();
        };

        let branch = self
            .branch
            .clone()
            .unwrap_or_else(|| repository.default_branch.clone());
        let prefix = self.query.text_before_trigger.clone();
        log::debug!("Committing {}:{}/{}", repository.full_name, branch, node.path);

        self.reset_to_repository_select();
        self.replace_input(prefix);
        self.filter_repositories();
        self.open = false;
        vec![Effect::Commit(Selection {
            repository,
            branch,
            file: node,
        })]
    }

    fn open_folder(&mut self, path: String) -> Vec<Effect> {
        let Some(repo) = &self.selected_repo else {
            return Vec::new();
        };
        let text = MentionParser::format(
            &self.query.text_before_trigger,
            &repo.name,
            self.branch.as_deref(),
            &path,
        );
        self.replace_input(text);
        self.debounce.cancel();
        self.is_searching = false;
        self.sync_file_browse()
    }

    fn escape(&mut self) -> Vec<Effect> {
        match self.mode {
            Mode::FileBrowse if !self.current_folder.is_empty() => {
                let parent = parent_path(&self.current_folder).to_string();
                self.open_folder(parent)
            }
            Mode::BranchSelect => {
                let prefix = self.query.text_before_trigger.clone();
                self.reset_to_repository_select();
                self.replace_input(prefix);
                self.filter_repositories();
                self.open = should_show_dropdown(&self.input, self.mode);
                Vec::new()
            }
            mode => {
                self.open = false;
                self.debounce.cancel();
                self.is_searching = false;
                if mode == Mode::FileBrowse {
                    let prefix = self.query.text_before_trigger.clone();
                    self.reset_to_repository_select();
                    self.replace_input(prefix);
                    self.filter_repositories();
                }
                Vec::new()
            }
        }
    }
}
