//! Predicates for CLI output.

#![allow(dead_code)]

use predicates::prelude::*;

/// `[label] text` row as printed with colors disabled.
pub fn has_row(label: &str, text: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("[{label}] {text}"))
}

pub fn no_roots_configured() -> impl Predicate<str> {
    predicates::str::contains("No repository roots configured")
}

pub fn repository_not_found(name: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("Repository not found: {name}"))
}
