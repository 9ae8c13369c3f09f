use crate::core::{command_init::SessionInit, error::Result, output::print_dropdown};
use std::path::PathBuf;

/// Resolve one mention and print the dropdown it produces.
pub fn execute_browse(roots: Vec<PathBuf>, mention: &str) -> Result<()> {
    let mut session = SessionInit::initialize(roots)?;
    session.input(mention);
    session.settle();
    println!();
    print_dropdown(session.controller());
    println!();
    Ok(())
}
