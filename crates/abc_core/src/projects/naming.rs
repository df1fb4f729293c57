//! Output file naming.

use std::path::{Path, PathBuf};

use crate::config::ExportSettings;

use super::types::ProjectFile;

/// Derive the export file name for a project file name.
///
/// Only a trailing `.<input_ext>` (exact case) is replaced; everything before
/// it is kept verbatim, so distinct inputs map to distinct outputs.
///
/// `track1.aup3` → `track1_processed.wav`
pub fn output_file_name(name: &str, input_ext: &str, suffix: &str, output_ext: &str) -> String {
    let input_ext = input_ext.trim_start_matches('.');
    let output_ext = output_ext.trim_start_matches('.');

    let stem = name
        .rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && *ext == input_ext)
        .map(|(stem, _)| stem)
        .unwrap_or(name);

    format!("{}{}.{}", stem, suffix, output_ext)
}

/// Full export path for `project` inside `output_dir`.
pub fn output_path_for(
    project: &ProjectFile,
    output_dir: &Path,
    export: &ExportSettings,
    input_ext: &str,
) -> PathBuf {
    output_dir.join(output_file_name(
        &project.name,
        input_ext,
        &export.output_suffix,
        &export.output_extension,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_input_extension() {
        assert_eq!(
            output_file_name("track1.aup3", "aup3", "_processed", "wav"),
            "track1_processed.wav"
        );
        assert_eq!(
            output_file_name("Track1.aup3", "aup3", "_processed", "wav"),
            "Track1_processed.wav"
        );
        assert_eq!(
            output_file_name("a.AUP3", "aup3", "_processed", "wav"),
            "a.AUP3_processed.wav"
        );
    }

    #[test]
    fn only_trailing_extension_is_touched() {
        assert_eq!(
            output_file_name("track1_processed.aup3", "aup3", "_processed", "wav"),
            "track1_processed_processed.wav"
        );
        assert_eq!(
            output_file_name("live.aup3.set.aup3", "aup3", "_processed", "wav"),
            "live.aup3.set_processed.wav"
        );
    }

    #[test]
    fn distinct_names_stay_distinct() {
        let names = ["a.aup3", "a_processed.aup3", "a.b.aup3", "A.aup3", "a.AUP3"];
        let outputs: std::collections::HashSet<String> = names
            .iter()
            .map(|n| output_file_name(n, "aup3", "_processed", "wav"))
            .collect();
        assert_eq!(outputs.len(), names.len());
    }

    #[test]
    fn path_joins_output_folder() {
        let project = ProjectFile::new("/in/b.aup3");
        let path = output_path_for(
            &project,
            Path::new("/out"),
            &ExportSettings::default(),
            "aup3",
        );
        assert_eq!(path, PathBuf::from("/out/b_processed.wav"));
    }

    #[test]
    fn custom_suffix_and_extension() {
        assert_eq!(
            output_file_name("a.aup3", ".aup3", "-clean", ".flac"),
            "a-clean.flac"
        );
    }
}
