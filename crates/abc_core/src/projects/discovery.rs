//! Project discovery in the input folder.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::ProjectFile;

/// Errors while scanning the input folder.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The input folder does not exist.
    #[error("Input folder '{0}' does not exist")]
    InputMissing(PathBuf),

    /// The input path exists but is not a folder.
    #[error("Input path '{0}' is not a folder")]
    NotADirectory(PathBuf),

    /// The folder could not be listed.
    #[error("Failed to read input folder '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Find every regular file in `dir` whose extension matches `extension`.
///
/// The extension must match exactly, case included, so every project maps
/// to its own output and log name. The result is sorted by file name, so a
/// batch always processes projects in the same order. Subfolders are not
/// scanned.
pub fn discover_projects(dir: &Path, extension: &str) -> Result<Vec<ProjectFile>, DiscoveryError> {
    if !dir.exists() {
        return Err(DiscoveryError::InputMissing(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(DiscoveryError::NotADirectory(dir.to_path_buf()));
    }

    let read_failed = |source| DiscoveryError::ReadFailed {
        path: dir.to_path_buf(),
        source,
    };

    let wanted = extension.trim_start_matches('.');
    let mut projects = Vec::new();

    for entry in fs::read_dir(dir).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let matches = path
            .extension()
            .map(|ext| ext == wanted)
            .unwrap_or(false);
        if matches {
            projects.push(ProjectFile::new(path));
        }
    }

    projects.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::info!(
        "Found {} .{} file(s) in {}",
        projects.len(),
        wanted,
        dir.display()
    );

    Ok(projects)
}
