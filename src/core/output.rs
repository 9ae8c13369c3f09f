//! Output formatting shared by all commands.
//!
//! # Design Principles
//! - **Consistent color scheme**: Red for errors, blue for names, bright_black for details
//! - **Standardized spacing**: Newline before and after command outputs
//! - **Numbered rows**: `[n]` markers, `[*]` for the default or selected row

use crate::core::autocomplete::{AutocompleteController, Mode, Results};
use crate::core::language::Language;
use crate::core::store::DurableStore;
use colored::*;

/// Formats and prints an error message with consistent styling
///
/// # Format
/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Formats and prints a success message with consistent styling
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Formats and prints a section header with consistent styling
///
/// # Format
/// ```text
///
/// <header>:
///
/// ```
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// `[label]` with muted brackets.
pub fn format_marker(label: &str) -> String {
    format!("{}{}{}", "[".bright_black(), label.white(), "]".bright_black())
}

fn row_marker(index: usize, selected: usize) -> String {
    if index == selected {
        format_marker("*")
    } else {
        format_marker(&(index + 1).to_string())
    }
}

/// Print the dropdown of `controller` the way a terminal user would see it.
pub fn print_dropdown<S: DurableStore>(controller: &AutocompleteController<S>) {
    let mode = match controller.mode() {
        Mode::RepositorySelect => "repositories",
        Mode::BranchSelect => "branches",
        Mode::FileBrowse => "files",
    };
    println!("{} {}", "›".bright_black(), controller.input().white());

    if !controller.is_open() {
        println!("  {}", "(closed)".bright_black());
        return;
    }
    if controller.is_loading() {
        println!("  {}", "Loading...".bright_black());
        return;
    }
    if controller.is_searching() {
        println!("  {}", "Searching...".bright_black());
        return;
    }
    if let Some(error) = controller.error() {
        println!("  {} {}", "✕".red(), error.red());
        return;
    }
    if controller.results().is_empty() {
        println!("  {}", format!("No {mode} found").bright_black());
        return;
    }

    let selected = controller.selected_index();
    match controller.results() {
        Results::Repositories(repos) => {
            for (i, repo) in repos.iter().enumerate() {
                println!(
                    "  {} {} {}",
                    row_marker(i, selected),
                    repo.name.blue(),
                    repo.full_name.bright_black()
                );
            }
        }
        Results::Branches(branches) => {
            for (i, branch) in branches.iter().enumerate() {
                let short_sha = branch.commit_sha.get(..7).unwrap_or(&branch.commit_sha);
                println!(
                    "  {} {} {}",
                    row_marker(i, selected),
                    branch.name.blue(),
                    short_sha.bright_black()
                );
            }
        }
        Results::Files(files) => {
            for (i, file) in files.iter().enumerate() {
                let label = if file.is_dir() {
                    format!("{}/", file.path).blue().bold()
                } else {
                    Language::from_path(&file.path).paint(&file.path)
                };
                println!("  {} {}", row_marker(i, selected), label);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_helpers_do_not_panic() {
        print_error("Test error message");
        print_success("Operation completed");
        print_info("Information message");
        print_section_header("Repositories");
    }

    #[test]
    fn test_format_marker_keeps_label() {
        colored::control::set_override(false);
        assert_eq!(format_marker("3"), "[3]");
        assert_eq!(row_marker(0, 0), "[*]");
        assert_eq!(row_marker(1, 0), "[2]");
        colored::control::unset_override();
    }
}
