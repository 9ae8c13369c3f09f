//! Data structures shared by the providers, the caches and the controller.
//!
//! # Public API
//! - [`FileNode`]: One entry of a repository tree (file or synthesized directory)
//! - [`NodeKind`]: File or directory marker
//! - [`Repository`]: A repository the user can mention
//! - [`Branch`]: A branch with its head commit and optional commit time
//! - [`sort_branches`] / [`sort_repositories`]: Display ordering rules
//!
//! # Serialization
//! `FileNode` serializes with the `{name, path, type, size, sha, download_url}`
//! layout used by the durable tree cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dir")]
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl FileNode {
    /// Build a file entry; `name` is derived from the last path segment.
    pub fn file(path: impl Into<String>, sha: impl Into<String>, size: Option<u64>) -> Self {
        let path = path.into();
        Self {
            name: last_segment(&path).to_string(),
            path,
            kind: NodeKind::File,
            size,
            sha: sha.into(),
            download_url: None,
        }
    }

    /// Build a synthesized directory entry. Directories carry no sha.
    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Directory,
            size: Some(0),
            sha: String::new(),
            download_url: None,
        }
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    /// `owner/name`
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub default_branch: String,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

impl Repository {
    pub fn new(full_name: impl Into<String>, default_branch: impl Into<String>) -> Self {
        let full_name = full_name.into();
        Self {
            name: last_segment(&full_name).to_string(),
            full_name,
            description: None,
            default_branch: default_branch.into(),
            pushed_at: None,
        }
    }

    pub fn owner(&self) -> &str {
        match self.full_name.split_once('/') {
            Some((owner, _)) => owner,
            None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit_sha: String,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub last_commit: Option<DateTime<Utc>>,
}

impl Branch {
    pub fn new(name: impl Into<String>, commit_sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_sha: commit_sha.into(),
            protected: false,
            last_commit: None,
        }
    }

    pub fn with_last_commit(mut self, at: DateTime<Utc>) -> Self {
        self.last_commit = Some(at);
        self
    }
}

/// Order branches for display: the default branch first, then most recent
/// commit first. Branches without commit metadata go after the dated ones,
/// alphabetically.
pub fn sort_branches(branches: &mut [Branch], default_branch: &str) {
    branches.sort_by(|a, b| {
        let a_default = a.name == default_branch;
        let b_default = b.name == default_branch;
        if a_default != b_default {
            return if a_default {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }

        match (a.last_commit, b.last_commit) {
            (Some(a_at), Some(b_at)) => b_at.cmp(&a_at).then_with(|| a.name.cmp(&b.name)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.name.cmp(&b.name),
        }
    });
}

/// Most recently pushed repositories first; undated ones last, by name.
pub fn sort_repositories(repositories: &mut [Repository]) {
    repositories.sort_by(|a, b| match (a.pushed_at, b.pushed_at) {
        (Some(a_at), Some(b_at)) => b_at.cmp(&a_at).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn test_file_name_is_last_segment() {
        let node = FileNode::file("src/core/cache.rs", "abc", Some(12));
        assert_eq!(node.name, "cache.rs");
        assert_eq!(node.kind, NodeKind::File);
        assert!(!node.is_dir());
    }

    #[test]
    fn test_file_node_json_layout() {
        let node = FileNode::file("a/b.ts", "123", None);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["name"], "b.ts");
        assert!(json.get("size").is_none());

        let dir = FileNode::directory("a", "a");
        let json = serde_json::to_value(&dir).unwrap();
        assert_eq!(json["type"], "dir");
    }

    #[test]
    fn test_repository_owner() {
        let repo = Repository::new("octo/widgets", "main");
        assert_eq!(repo.owner(), "octo");
        assert_eq!(repo.name, "widgets");
    }

    #[test]
    fn test_sort_branches_default_first_then_recent() {
        let mut branches = vec![
            Branch::new("zeta", "1"),
            Branch::new("old", "2").with_last_commit(at(100)),
            Branch::new("main", "3").with_last_commit(at(50)),
            Branch::new("alpha", "4"),
            Branch::new("fresh", "5").with_last_commit(at(200)),
        ];
        sort_branches(&mut branches, "main");
        let names: Vec<_> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["main", "fresh", "old", "alpha", "zeta"]);
    }

    #[test]
    fn test_sort_repositories_by_push_time() {
        let mut repos = vec![
            Repository::new("o/b", "main"),
            Repository {
                pushed_at: Some(at(10)),
                ..Repository::new("o/old", "main")
            },
            Repository {
                pushed_at: Some(at(20)),
                ..Repository::new("o/new", "main")
            },
            Repository::new("o/a", "main"),
        ];
        sort_repositories(&mut repos);
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["new", "old", "a", "b"]);
    }
}
