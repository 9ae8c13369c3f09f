use clap::{Parser, Subcommand};
use git_mention::commands::*;
use git_mention::core::{
    error::{MentionError, Result},
    print_error,
};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-mention")]
#[command(about = "Autocomplete @repo:branch/path mentions across local git repositories")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Directory containing git repositories (repeatable, overrides config)
    #[arg(long = "root", global = true, value_name = "DIR")]
    roots: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List repositories, most recently committed first
    Repos {
        /// Case-insensitive name filter
        filter: Option<String>,
    },
    /// List the branches of a repository, default branch first
    Branches {
        /// Repository name or owner/name
        repository: String,
    },
    /// Show the dropdown for a mention (e.g. "@repo:branch/src/")
    Browse {
        /// Mention text
        mention: String,
    },
    /// Run a scripted autocomplete session read from stdin
    Complete,
    /// Inspect or clear cached trees
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Clear one tree (owner/repo[:branch]) or everything
    Clear { target: Option<String> },
    /// List cached trees
    List,
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        match e {
            MentionError::NoRepositoriesConfigured => print_error(
                "No repository roots configured. Pass --root <DIR> or set repository_roots in config.json",
            ),
            e => print_error(&e.to_string()),
        }
        std::process::exit(1);
    }
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let roots = cli.roots;
    match cli.command {
        Commands::Repos { filter } => report(execute_repos(roots, filter)),
        Commands::Branches { repository } => report(execute_branches(roots, &repository)),
        Commands::Browse { mention } => report(execute_browse(roots, &mention)),
        Commands::Complete => report(execute_complete(roots)),
        Commands::Cache { action } => match action {
            CacheAction::Clear { target } => report(execute_cache_clear(target)),
            CacheAction::List => report(execute_cache_list()),
        },
    }
}
