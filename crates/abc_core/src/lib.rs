//! ABC Core - Backend logic for Audacity Batch Cleaner
//!
//! This crate drives a running Audacity instance through its scripting
//! pipe to clean up a folder of project files, one project at a time.
//! It has no UI dependencies and is used by the `audacity-batch` CLI.

pub mod config;
pub mod editor;
pub mod logging;
pub mod orchestrator;
pub mod projects;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
