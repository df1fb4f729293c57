//! Batch results and the JSON report.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::editor::CloseOutcome;

use super::types::JobState;

/// Final status of one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Succeeded,
    Skipped,
    Failed,
}

/// Result of processing a single project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResult {
    /// Project file name.
    pub project: String,
    pub input_path: PathBuf,
    pub status: ProjectStatus,
    /// Export path (if written).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Error message (if failed) or skip reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Steps that completed.
    pub steps_completed: Vec<String>,
    /// How the editor was closed; `None` if it never started.
    pub close: Option<CloseOutcome>,
    /// Per-project log file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    /// What each step recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<JobState>,
    pub duration_secs: f64,
}

impl ProjectResult {
    pub fn new(project: impl Into<String>, input_path: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            input_path: input_path.into(),
            status: ProjectStatus::Failed,
            output_path: None,
            message: None,
            steps_completed: Vec::new(),
            close: None,
            log_path: None,
            state: None,
            duration_secs: 0.0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ProjectStatus::Succeeded
    }

    pub fn is_failure(&self) -> bool {
        self.status == ProjectStatus::Failed
    }
}

/// Results of a whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub started_at: String,
    pub finished_at: Option<String>,
    pub input_folder: PathBuf,
    pub output_folder: PathBuf,
    pub results: Vec<ProjectResult>,
}

impl BatchReport {
    pub fn new(input_folder: impl Into<PathBuf>, output_folder: impl Into<PathBuf>) -> Self {
        Self {
            started_at: chrono::Local::now().to_rfc3339(),
            finished_at: None,
            input_folder: input_folder.into(),
            output_folder: output_folder.into(),
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: ProjectResult) {
        self.results.push(result);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(chrono::Local::now().to_rfc3339());
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    fn count(&self, status: ProjectStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(ProjectStatus::Succeeded)
    }

    pub fn failed(&self) -> usize {
        self.count(ProjectStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(ProjectStatus::Skipped)
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Write the report as pretty JSON, named after the start time.
    pub fn write_json(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("batch_report_{}.json", stamp));
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, status: ProjectStatus) -> ProjectResult {
        let mut r = ProjectResult::new(name, format!("/in/{}", name));
        r.status = status;
        r
    }

    #[test]
    fn counts_by_status() {
        let mut report = BatchReport::new("input", "output");
        report.push(result("a.aup3", ProjectStatus::Succeeded));
        report.push(result("b.aup3", ProjectStatus::Failed));
        report.push(result("c.aup3", ProjectStatus::Skipped));
        report.push(result("d.aup3", ProjectStatus::Succeeded));

        assert_eq!(report.total(), 4);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn writes_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = BatchReport::new("input", "output");
        let mut ok = result("a.aup3", ProjectStatus::Succeeded);
        ok.close = Some(CloseOutcome::Exited);
        report.push(ok);
        report.finish();

        let path = report.write_json(dir.path()).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["results"][0]["status"], "succeeded");
        assert_eq!(value["results"][0]["close"], "Exited");
        assert!(value["finished_at"].is_string());
    }
}
