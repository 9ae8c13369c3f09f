//! Directory views derived from flat file lists.
//!
//! Providers only return files; folders are synthesized here on every read so
//! the flat list stays the single source of truth.

use crate::core::model::FileNode;
use std::collections::HashSet;

/// List the direct children of `path` (`""` is the repository root).
///
/// Directories come first, then files; each group is ordered by name
/// (case-insensitive).
pub fn get_items_for_path(all_files: &[FileNode], path: &str) -> Vec<FileNode> {
    let path = path.trim_matches('/');
    let mut seen_dirs: HashSet<String> = HashSet::new();
    let mut items = Vec::new();

    for file in all_files {
        let relative = if path.is_empty() {
            file.path.as_str()
        } else {
            match file
                .path
                .strip_prefix(path)
                .and_then(|rest| rest.strip_prefix('/'))
            {
                Some(rest) => rest,
                None => continue,
            }
        };

        match relative.find('/') {
            None if relative.is_empty() => {}
            None => {
                if file.is_dir() && !seen_dirs.insert(file.path.clone()) {
                    continue;
                }
                items.push(file.clone());
            }
            Some(0) => {}
            Some(slash) => {
                let folder_name = &relative[..slash];
                let full_path = join_path(path, folder_name);
                if seen_dirs.insert(full_path.clone()) {
                    items.push(FileNode::directory(folder_name, full_path));
                }
            }
        }
    }

    items.sort_by(|a, b| {
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
    items
}

/// Parent folder of `path`, or `""` at the top level.
pub fn parent_path(path: &str) -> &str {
    match path.trim_end_matches('/').rfind('/') {
        Some(idx) if idx > 0 => &path[..idx],
        _ => "",
    }
}

pub fn join_path(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{folder}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::NodeKind;

    fn files(paths: &[&str]) -> Vec<FileNode> {
        paths
            .iter()
            .map(|p| FileNode::file(*p, format!("sha-{p}"), Some(1)))
            .collect()
    }

    fn summary(items: &[FileNode]) -> Vec<(NodeKind, &str)> {
        items.iter().map(|i| (i.kind, i.path.as_str())).collect()
    }

    #[test]
    fn test_root_listing_dirs_first() {
        let all = files(&["a/b.ts", "a/c/d.ts", "e.ts"]);
        let items = get_items_for_path(&all, "");
        assert_eq!(
            summary(&items),
            vec![(NodeKind::Directory, "a"), (NodeKind::File, "e.ts")]
        );
        assert_eq!(items[0].name, "a");
    }

    #[test]
    fn test_nested_listing() {
        let all = files(&["a/b.ts", "a/c/d.ts", "e.ts"]);
        let items = get_items_for_path(&all, "a");
        assert_eq!(
            summary(&items),
            vec![(NodeKind::Directory, "a/c"), (NodeKind::File, "a/b.ts")]
        );
        assert_eq!(items[0].name, "c");
    }

    #[test]
    fn test_trailing_slash_and_sibling_prefix() {
        let all = files(&["src/main.rs", "src2/other.rs", "src/lib.rs"]);
        let items = get_items_for_path(&all, "src/");
        assert_eq!(
            summary(&items),
            vec![(NodeKind::File, "src/lib.rs"), (NodeKind::File, "src/main.rs")]
        );
    }

    #[test]
    fn test_alphabetical_case_insensitive() {
        let all = files(&["Zeta.md", "alpha.md", "Beta/x.md", "apple/y.md"]);
        let items = get_items_for_path(&all, "");
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "Beta", "alpha.md", "Zeta.md"]);
    }

    #[test]
    fn test_provider_directory_nodes_are_not_duplicated() {
        let mut all = vec![FileNode::directory("docs", "docs")];
        all.extend(files(&["docs/readme.md", "top.txt"]));
        let items = get_items_for_path(&all, "");
        assert_eq!(
            summary(&items),
            vec![(NodeKind::Directory, "docs"), (NodeKind::File, "top.txt")]
        );
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let all = files(&["a/b.ts"]);
        assert!(get_items_for_path(&all, "nope").is_empty());
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("a/c"), "a");
        assert_eq!(parent_path("a"), "");
        assert_eq!(parent_path(""), "");
        assert_eq!(parent_path("a/b/c/"), "a/b");
    }
}
