//! Shared helpers for git-mention integration tests.
//!
//! Real git repositories for the CLI and the local provider, plus a scripted
//! in-memory provider for driving sessions deterministically.

pub mod assertions;
pub mod fixtures;
pub mod repository;
