//! Project file type.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// An editor project found in the input folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Full path to the project.
    pub path: PathBuf,
    /// File name including extension.
    pub name: String,
}

impl ProjectFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without its extension, used for log and job names.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone())
    }
}
