//! Tolerant parsing of `@repo[:branch]/path` mentions.
//!
//! This module provides [`MentionParser`] which turns whatever the user has typed
//! so far into a [`MentionQuery`]. Parsing never fails: partial input such as a
//! lone `@` or a trailing `:` still yields a best-effort structure.
//!
//! # Grammar
//! - Everything before the **last** `@` is inert prefix text.
//! - In the mention body, a `:` that appears before the first `/` (or with no
//!   `/` at all) splits off the repository name; the branch runs up to the next
//!   `/` or the end of input.
//! - Otherwise the repository name runs up to the first `/`.
//! - Everything after that `/` is the file path. A trailing `/` means "list
//!   this folder" rather than "search for this fragment".

pub const TRIGGER: char = '@';
const BRANCH_MARKER: char = ':';
const SEPARATOR: char = '/';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionQuery {
    pub text_before_trigger: String,
    pub repo_name: String,
    /// Empty means the repository's default branch.
    pub branch: String,
    pub file_path: String,
    pub has_trigger: bool,
    pub has_branch_marker: bool,
    /// A `/` follows the repository (and branch) part.
    pub has_path: bool,
}

impl MentionQuery {
    /// The fragment after the last `/` of the file path, if the user is
    /// searching rather than browsing.
    pub fn search_fragment(&self) -> Option<&str> {
        if self.is_browsing() {
            return None;
        }
        Some(match self.file_path.rfind(SEPARATOR) {
            Some(idx) => &self.file_path[idx + 1..],
            None => &self.file_path,
        })
    }

    /// True when the path is empty or ends with `/`.
    pub fn is_browsing(&self) -> bool {
        self.file_path.is_empty() || self.file_path.ends_with(SEPARATOR)
    }

    /// The folder part of the file path without a trailing `/`.
    pub fn folder(&self) -> &str {
        if self.is_browsing() {
            return self.file_path.trim_end_matches(SEPARATOR);
        }
        match self.file_path.rfind(SEPARATOR) {
            Some(idx) => &self.file_path[..idx],
            None => "",
        }
    }
}

pub struct MentionParser;

impl MentionParser {
    pub fn parse(input: &str) -> MentionQuery {
        let Some(at) = input.rfind(TRIGGER) else {
            return MentionQuery {
                text_before_trigger: input.to_string(),
                ..Default::default()
            };
        };

        let prefix = &input[..at];
        let body = &input[at + TRIGGER.len_utf8()..];
        let mut query = MentionQuery {
            text_before_trigger: prefix.to_string(),
            has_trigger: true,
            ..Default::default()
        };

        let colon = body.find(BRANCH_MARKER);
        let slash = body.find(SEPARATOR);

        match (colon, slash) {
            (Some(c), s) if s.map_or(true, |s| c < s) => {
                query.repo_name = body[..c].to_string();
                query.has_branch_marker = true;
                let rest = &body[c + 1..];
                match rest.find(SEPARATOR) {
                    Some(s) => {
                        query.branch = rest[..s].to_string();
                        query.file_path = rest[s + 1..].to_string();
                        query.has_path = true;
                    }
                    None => query.branch = rest.to_string(),
                }
            }
            (_, Some(s)) => {
                query.repo_name = body[..s].to_string();
                query.file_path = body[s + 1..].to_string();
                query.has_path = true;
            }
            (_, None) => query.repo_name = body.to_string(),
        }

        query
    }

    /// Render a mention back into input text.
    pub fn format(prefix: &str, repo_name: &str, branch: Option<&str>, folder: &str) -> String {
        let mut out = String::with_capacity(prefix.len() + repo_name.len() + folder.len() + 8);
        out.push_str(prefix);
        out.push(TRIGGER);
        out.push_str(repo_name);
        if let Some(branch) = branch {
            out.push(BRANCH_MARKER);
            out.push_str(branch);
        }
        out.push(SEPARATOR);
        if !folder.is_empty() {
            out.push_str(folder);
            out.push(SEPARATOR);
        }
        out
    }
}
