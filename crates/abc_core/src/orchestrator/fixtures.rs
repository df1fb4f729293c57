//! Shared test fixtures for pipeline and step tests.

use std::path::Path;
use std::sync::Arc;

use crate::config::Settings;
use crate::logging::{JobLogger, LogConfig};
use crate::projects::{output_path_for, ProjectFile};

use super::types::Context;

/// Settings with all pacing disabled.
pub fn fast_settings() -> Settings {
    let mut settings = Settings::default();
    settings.pacing.settle_ms = 0;
    settings.pacing.between_files_secs = 0;
    settings
}

/// Context for `<dir>/input/<name>` exporting into `<dir>/output`.
pub fn context(dir: &Path, name: &str, settings: Settings) -> Context {
    let project = ProjectFile::new(dir.join("input").join(name));
    let output_dir = dir.join("output");
    std::fs::create_dir_all(&output_dir).unwrap();
    let output_path = output_path_for(
        &project,
        &output_dir,
        &settings.export,
        &settings.paths.input_extension,
    );
    let logger = Arc::new(
        JobLogger::new(project.stem(), dir.join(".logs"), LogConfig::default(), None).unwrap(),
    );
    Context::new(settings, project, output_path, logger)
}
