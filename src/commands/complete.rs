//! Scripted autocomplete session read from stdin.
//!
//! Plain lines replace the input text. Lines starting with `:` are events:
//! `:up`, `:down`, `:enter`, `:esc`, `:tick`, and `:select N` (1-based).

use crate::core::{
    autocomplete::Key,
    command_init::{LocalSession, SessionInit},
    error::Result,
    output::print_dropdown,
    print_section_header, print_success,
};
use colored::*;
use std::io::BufRead;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Input(String),
    Key(Key),
    Tick,
    Select(usize),
}

impl ScriptStep {
    pub fn parse(line: &str) -> Option<Self> {
        let Some(event) = line.strip_prefix(':') else {
            return Some(Self::Input(line.to_string()));
        };
        match event.trim() {
            "up" => Some(Self::Key(Key::Up)),
            "down" => Some(Self::Key(Key::Down)),
            "enter" => Some(Self::Key(Key::Enter)),
            "esc" | "escape" => Some(Self::Key(Key::Escape)),
            "tick" => Some(Self::Tick),
            other => {
                let index = other.strip_prefix("select")?.trim().parse::<usize>().ok()?;
                index.checked_sub(1).map(Self::Select)
            }
        }
    }
}

fn apply(session: &mut LocalSession, step: ScriptStep) {
    match step {
        ScriptStep::Input(text) => session.input(&text),
        ScriptStep::Key(key) => session.key(key),
        ScriptStep::Tick => {
            session.settle();
        }
        ScriptStep::Select(index) => session.select(index),
    }
}

pub fn execute_complete(roots: Vec<PathBuf>) -> Result<()> {
    let mut session = SessionInit::initialize(roots)?;
    let stdin = std::io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let Some(step) = ScriptStep::parse(&line) else {
            log::warn!("Ignoring unknown event '{line}'");
            println!("{} {}", "?".yellow(), line.bright_black());
            continue;
        };
        apply(&mut session, step);
        print_dropdown(session.controller());
    }

    if session.committed().is_empty() {
        return Ok(());
    }
    print_section_header("Selected");
    for selection in session.committed() {
        println!("  {}", selection.mention().green());
    }
    print_success(&format!("{} file(s) selected", session.committed().len()));
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script_steps() {
        assert_eq!(
            ScriptStep::parse("see @alpha/"),
            Some(ScriptStep::Input("see @alpha/".to_string()))
        );
        assert_eq!(ScriptStep::parse(""), Some(ScriptStep::Input(String::new())));
        assert_eq!(ScriptStep::parse(":down"), Some(ScriptStep::Key(Key::Down)));
        assert_eq!(ScriptStep::parse(":esc"), Some(ScriptStep::Key(Key::Escape)));
        assert_eq!(ScriptStep::parse(":tick"), Some(ScriptStep::Tick));
        assert_eq!(ScriptStep::parse(":select 2"), Some(ScriptStep::Select(1)));
        assert_eq!(ScriptStep::parse(":select 0"), None);
        assert_eq!(ScriptStep::parse(":jump"), None);
    }
}
