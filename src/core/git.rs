//! Local git repositories as a [`TreeProvider`].
//!
//! Repositories are discovered under configured root directories: a root that
//! is itself a repository, and every direct subdirectory that is one. The
//! owner of a repository is the name of the directory containing it, so
//! `~/src/alpha` becomes `src/alpha`.
//!
//! # Public API
//! - [`LocalGitProvider`]: Reads repositories, branches and trees through `git2`
//!
//! # Key Features
//! - **Branch trees**: Trees are read from `refs/heads/<branch>`, not the working copy
//! - **Directory nodes**: Recursive listings include tree entries as directories
//! - **Commit metadata**: Branches carry their head commit sha and time

use crate::core::error::{MentionError, Result};
use crate::core::model::{Branch, FileNode, Repository};
use crate::core::provider::TreeProvider;
use chrono::{DateTime, Utc};
use git2::{BranchType, ObjectType, Oid, TreeWalkMode, TreeWalkResult};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalGitProvider {
    roots: Vec<PathBuf>,
}

struct Located {
    full_name: String,
    path: PathBuf,
}

fn dir_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn commit_time(repo: &git2::Repository, oid: Oid) -> Option<DateTime<Utc>> {
    let commit = repo.find_commit(oid).ok()?;
    DateTime::from_timestamp(commit.time().seconds(), 0)
}

impl LocalGitProvider {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn locate_all(&self) -> Vec<Located> {
        let mut found = Vec::new();
        for root in &self.roots {
            let root = root.canonicalize().unwrap_or_else(|_| root.clone());
            if root.join(".git").exists() {
                if let Some(located) = Self::located(&root) {
                    found.push(located);
                }
                continue;
            }

            let entries = match std::fs::read_dir(&root) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Cannot read repository root {}: {e}", root.display());
                    continue;
                }
            };
            let mut children: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.join(".git").exists())
                .collect();
            children.sort();
            found.extend(children.iter().filter_map(|p| Self::located(p)));
        }
        log::debug!("Discovered {} repositories", found.len());
        found
    }

    fn located(path: &Path) -> Option<Located> {
        let name = dir_name(path)?;
        let owner = path.parent().and_then(dir_name).unwrap_or("local");
        Some(Located {
            full_name: format!("{owner}/{name}"),
            path: path.to_path_buf(),
        })
    }

    fn open(&self, owner: &str, repo: &str) -> Result<git2::Repository> {
        let full_name = format!("{owner}/{repo}");
        let located = self
            .locate_all()
            .into_iter()
            .find(|l| l.full_name == full_name)
            .ok_or_else(|| MentionError::repository_not_found(&full_name))?;
        Ok(git2::Repository::open(&located.path)?)
    }

    fn branch_tree<'r>(
        repo: &'r git2::Repository,
        full_name: &str,
        branch: &str,
    ) -> Result<git2::Tree<'r>> {
        let reference = repo
            .find_branch(branch, BranchType::Local)
            .map_err(|_| MentionError::branch_not_found(full_name, branch))?;
        Ok(reference.get().peel_to_tree()?)
    }

    fn describe(located: &Located) -> Result<Repository> {
        let repo = git2::Repository::open(&located.path)?;
        let head = repo.head().ok();
        let default_branch = head
            .as_ref()
            .filter(|h| h.is_branch())
            .and_then(|h| h.shorthand())
            .unwrap_or("main")
            .to_string();

        let mut repository = Repository::new(&located.full_name, default_branch);
        repository.pushed_at = head
            .and_then(|h| h.target())
            .and_then(|oid| commit_time(&repo, oid));
        Ok(repository)
    }
}

impl TreeProvider for LocalGitProvider {
    fn list_repositories(&self) -> Result<Vec<Repository>> {
        if self.roots.is_empty() {
            return Err(MentionError::NoRepositoriesConfigured);
        }
        let mut repositories = Vec::new();
        for located in self.locate_all() {
            match Self::describe(&located) {
                Ok(repository) => repositories.push(repository),
                Err(e) => log::warn!("Skipping {}: {e}", located.path.display()),
            }
        }
        Ok(repositories)
    }

    fn fetch_tree(&self, owner: &str, repo: &str, branch: &str) -> Result<Vec<FileNode>> {
        let git_repo = self.open(owner, repo)?;
        let tree = Self::branch_tree(&git_repo, &format!("{owner}/{repo}"), branch)?;

        let mut files = Vec::new();
        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            let Some(name) = entry.name() else {
                log::warn!("Skipping non UTF-8 entry under '{root}'");
                return TreeWalkResult::Skip;
            };
            let path = format!("{root}{name}");
            match entry.kind() {
                Some(ObjectType::Blob) => {
                    let size = git_repo.find_blob(entry.id()).ok().map(|b| b.size() as u64);
                    files.push(FileNode::file(path, entry.id().to_string(), size));
                }
                // Folders are synthesized from file paths when listing.
                _ => {}
            }
            TreeWalkResult::Ok
        })?;

        log::debug!("Read {} files from {owner}/{repo}:{branch}", files.len());
        Ok(files)
    }

    fn fetch_branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>> {
        let git_repo = self.open(owner, repo)?;
        let mut branches = Vec::new();
        for item in git_repo.branches(Some(BranchType::Local))? {
            let (branch, _) = item?;
            let Some(name) = branch.name()? else {
                continue;
            };
            let Some(oid) = branch.get().target() else {
                continue;
            };
            let mut entry = Branch::new(name, oid.to_string());
            if let Some(at) = commit_time(&git_repo, oid) {
                entry = entry.with_last_commit(at);
            }
            branches.push(entry);
        }
        Ok(branches)
    }

    fn fetch_folder(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Vec<FileNode>> {
        let git_repo = self.open(owner, repo)?;
        let root = Self::branch_tree(&git_repo, &format!("{owner}/{repo}"), branch)?;
        let folder = path.trim_matches('/');
        let tree = if folder.is_empty() {
            root
        } else {
            root.get_path(Path::new(folder))?
                .to_object(&git_repo)?
                .peel_to_tree()?
        };

        let mut nodes = Vec::new();
        for entry in tree.iter() {
            let name = entry.name().ok_or(MentionError::InvalidUtf8Path)?;
            let child = crate::core::folder::join_path(folder, name);
            match entry.kind() {
                Some(ObjectType::Blob) => {
                    let size = git_repo.find_blob(entry.id()).ok().map(|b| b.size() as u64);
                    nodes.push(FileNode::file(child, entry.id().to_string(), size));
                }
                Some(ObjectType::Tree) => nodes.push(FileNode::directory(name, child)),
                _ => {}
            }
        }
        Ok(nodes)
    }

    fn identity(&self) -> String {
        self.roots
            .iter()
            .map(|r| r.display().to_string())
            .collect::<Vec<_>>()
            .join(";")
    }
}
