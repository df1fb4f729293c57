//! Project discovery and output naming.
//!
//! This module provides:
//! - `discover_projects`: eligible project files in the input folder, sorted
//! - `output_file_name` / `output_path_for`: where each export lands

mod discovery;
mod naming;
mod types;

pub use discovery::{discover_projects, DiscoveryError};
pub use naming::{output_file_name, output_path_for};
pub use types::ProjectFile;
