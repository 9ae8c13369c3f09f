//! Temporary workspaces of real git repositories.
//!
//! A workspace is a temp directory holding a `work/` root with one git
//! repository per subdirectory, plus isolated config and cache homes so CLI
//! runs never touch the user's files.

#![allow(dead_code)]

use git_mention::core::error::{MentionError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// The TempDir must be kept alive for the duration of the test.
pub struct TestWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestWorkspace {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repo_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn cache_home(&self) -> PathBuf {
        self.temp_dir.path().join("cache")
    }

    pub fn config_home(&self) -> PathBuf {
        self.temp_dir.path().join("config")
    }

    /// `git-mention --root <root>` with isolated XDG homes.
    pub fn command(&self) -> Result<assert_cmd::Command> {
        let mut cmd = assert_cmd::Command::cargo_bin("git-mention")
            .map_err(|e| MentionError::fetch_failed("binary", e.to_string()))?;
        cmd.env("XDG_CACHE_HOME", self.cache_home())
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("NO_COLOR", "1")
            .arg("--root")
            .arg(&self.root);
        Ok(cmd)
    }
}

pub fn setup_workspace() -> Result<TestWorkspace> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("work");
    fs::create_dir_all(&root)?;
    Ok(TestWorkspace { temp_dir, root })
}

fn git(repo_path: &Path, args: &[&str]) -> Result<()> {
    Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .map_err(MentionError::Io)?;
    Ok(())
}

/// Initializes `name` under the workspace root, commits `files` on `main`.
pub fn add_repository(workspace: &TestWorkspace, name: &str, files: &[&str]) -> Result<PathBuf> {
    let path = workspace.repo_path(name);
    fs::create_dir_all(&path)?;
    git(&path, &["init"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    create_test_files(&path, files)?;
    git_add(&path, ".")?;
    git_commit(&path, "Initial commit")?;
    git(&path, &["branch", "-M", "main"])?;
    Ok(path)
}

pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    let file = repo_path.join(filename);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file, content)?;
    Ok(())
}

pub fn create_test_files(repo_path: &Path, filenames: &[&str]) -> Result<()> {
    for (i, filename) in filenames.iter().enumerate() {
        create_file(repo_path, filename, &format!("content{}\n", i + 1))?;
    }
    Ok(())
}

pub fn git_add(repo_path: &Path, filename: &str) -> Result<()> {
    git(repo_path, &["add", filename])
}

pub fn git_commit(repo_path: &Path, message: &str) -> Result<()> {
    git(repo_path, &["commit", "-m", message])
}

pub fn git_branch(repo_path: &Path, name: &str) -> Result<()> {
    git(repo_path, &["branch", name])
}
