use crate::core::{
    command_init::SessionInit, error::Result, output::format_marker, print_info,
    print_section_header,
};
use colored::*;
use std::path::PathBuf;

pub fn execute_repos(roots: Vec<PathBuf>, filter: Option<String>) -> Result<()> {
    let session = SessionInit::initialize(roots)?;
    let needle = filter.unwrap_or_default().to_lowercase();
    let repositories: Vec<_> = session
        .controller()
        .repositories()
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .collect();

    if repositories.is_empty() {
        print_info("No repositories found.");
        return Ok(());
    }

    print_section_header("Repositories");
    for (i, repo) in repositories.iter().enumerate() {
        let pushed = repo
            .pushed_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{} {} {} {}",
            format_marker(&(i + 1).to_string()),
            repo.full_name.blue(),
            format!("({})", repo.default_branch).bright_black(),
            pushed.bright_black()
        );
    }
    println!();
    Ok(())
}
