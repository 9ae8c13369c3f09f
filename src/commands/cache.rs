use crate::core::{
    cache::cache_key,
    command_init::SessionInit,
    error::Result,
    output::format_marker,
    print_info, print_section_header, print_success,
    repo_list_cache::REPOSITORY_LIST_KEY,
    store::DurableStore,
};
use colored::*;
use std::path::PathBuf;

/// Remove one tree (`owner/repo[:branch]`) or every cached entry.
pub fn execute_cache_clear(target: Option<String>) -> Result<()> {
    let config = SessionInit::config(Vec::<PathBuf>::new())?;
    let mut cache = SessionInit::cache(&config)?;

    match target {
        Some(target) => {
            let key = match target.split_once(':') {
                Some((repo, branch)) => cache_key(repo, Some(branch)),
                None => cache_key(&target, None),
            };
            cache.clear(&key);
            print_success(&format!("Cleared cached tree {key}"));
        }
        None => {
            cache.clear_all();
            cache.store_mut().remove(REPOSITORY_LIST_KEY)?;
            print_success("Cleared all cached trees and repositories");
        }
    }
    println!();
    Ok(())
}

pub fn execute_cache_list() -> Result<()> {
    let config = SessionInit::config(Vec::<PathBuf>::new())?;
    let cache = SessionInit::cache(&config)?;
    let keys = cache.durable_keys();

    if keys.is_empty() {
        print_info("No cached trees.");
        return Ok(());
    }
    print_section_header("Cached trees");
    for (i, key) in keys.iter().enumerate() {
        println!("{} {}", format_marker(&(i + 1).to_string()), key.blue());
    }
    println!();
    Ok(())
}
