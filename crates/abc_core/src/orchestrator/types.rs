//! Core types for the orchestrator pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::logging::JobLogger;
use crate::projects::ProjectFile;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Contains the project and settings that steps can read but not modify.
/// Mutable state goes in `JobState`; the editor is passed separately.
pub struct Context {
    /// Application settings.
    pub settings: Settings,
    /// Project being processed.
    pub project: ProjectFile,
    /// Where the export is written.
    pub output_path: PathBuf,
    /// Job name (project stem), used in logs and errors.
    pub job_name: String,
    /// Per-project logger.
    pub logger: Arc<JobLogger>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a project.
    pub fn new(
        settings: Settings,
        project: ProjectFile,
        output_path: PathBuf,
        logger: Arc<JobLogger>,
    ) -> Self {
        Self {
            job_name: project.stem(),
            settings,
            project,
            output_path,
            logger,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// Each step records what it did in its own section; the state is written
/// into the batch report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Job identifier (project stem).
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    /// Noise sample window (from NoiseProfile step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_profile: Option<NoiseProfileOutput>,
    /// Whether the whole track was selected.
    #[serde(default)]
    pub selected_all: bool,
    /// Effects applied, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<EffectRecord>,
    /// Export results (from Export step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportOutput>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    pub fn has_noise_profile(&self) -> bool {
        self.noise_profile.is_some()
    }

    /// Check whether an effect with this step name was applied.
    pub fn has_effect(&self, step: &str) -> bool {
        self.effects.iter().any(|e| e.step == step)
    }

    pub fn has_export(&self) -> bool {
        self.export.is_some()
    }
}

/// Output from the NoiseProfile step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseProfileOutput {
    pub start_secs: f64,
    pub end_secs: f64,
}

/// One effect applied to the whole track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectRecord {
    /// Step that applied it.
    pub step: String,
    /// Command line sent to the editor.
    pub command: String,
}

/// Output from the Export step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutput {
    pub output_path: PathBuf,
    pub num_channels: u32,
    /// An earlier export at the same path was deleted first.
    pub replaced_existing: bool,
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}
