use crate::core::error::Result;
use crate::core::model::{Branch, FileNode, Repository};

/// Source of repositories, branches and trees.
///
/// Every call may fail; callers decide whether a failure is fatal. Paths are
/// `/`-separated and relative to the repository root.
pub trait TreeProvider {
    fn list_repositories(&self) -> Result<Vec<Repository>>;

    /// Full recursive listing of `branch`.
    fn fetch_tree(&self, owner: &str, repo: &str, branch: &str) -> Result<Vec<FileNode>>;

    fn fetch_branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>>;

    /// Direct children of `path` only. `""` is the repository root.
    fn fetch_folder(&self, owner: &str, repo: &str, path: &str, branch: &str)
        -> Result<Vec<FileNode>>;

    /// Identity the cached repository list is bound to.
    fn identity(&self) -> String;
}
