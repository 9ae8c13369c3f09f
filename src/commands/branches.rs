use crate::core::{
    command_init::SessionInit,
    error::{MentionError, Result},
    model::sort_branches,
    output::format_marker,
    print_info, print_section_header,
    provider::TreeProvider,
};
use colored::*;
use std::path::PathBuf;

/// List the branches of `repository` (name or `owner/name`), default first.
pub fn execute_branches(roots: Vec<PathBuf>, repository: &str) -> Result<()> {
    let session = SessionInit::initialize(roots)?;
    let repo = session
        .controller()
        .repositories()
        .iter()
        .find(|r| {
            r.full_name.eq_ignore_ascii_case(repository) || r.name.eq_ignore_ascii_case(repository)
        })
        .ok_or_else(|| MentionError::repository_not_found(repository))?;

    let mut branches = session.provider().fetch_branches(repo.owner(), &repo.name)?;
    if branches.is_empty() {
        print_info("No branches found. Make your first commit to create one.");
        return Ok(());
    }
    sort_branches(&mut branches, &repo.default_branch);

    print_section_header(&format!("Branches of {}", repo.full_name));
    let mut index = 0;
    for branch in &branches {
        let marker = if branch.name == repo.default_branch {
            format_marker("*")
        } else {
            index += 1;
            format_marker(&index.to_string())
        };
        let short_sha = branch.commit_sha.get(..7).unwrap_or(&branch.commit_sha);
        let when = branch
            .last_commit
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "{} {} {} {}",
            marker,
            branch.name.blue(),
            short_sha.bright_black(),
            when.bright_black()
        );
    }
    println!();
    Ok(())
}
