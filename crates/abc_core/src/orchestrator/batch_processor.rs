//! Batch processor: runs every project in the input folder through the
//! standard pipeline, one editor instance at a time.
//!
//! For each project the editor is launched, the pipeline runs, and the
//! editor is closed again, in that order. The open session lives in a
//! guard that closes it on every path out of `process_project`, so a
//! failing step never leaves an editor running into the next project.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use thiserror::Error;

use crate::config::Settings;
use crate::editor::{CloseOutcome, EditorError, EditorLauncher, EditorResult, EditorSession};
use crate::logging::{ConsoleCallback, JobLogger, LogConfig};
use crate::projects::{discover_projects, output_path_for, DiscoveryError, ProjectFile};

use super::create_standard_pipeline;
use super::report::{BatchReport, ProjectResult, ProjectStatus};
use super::types::{Context, JobState};

/// Console sink shared by every project's logger.
pub type SharedConsole = Arc<dyn Fn(&str) + Send + Sync>;

/// Progress sink: (project, step_name, percent).
pub type BatchProgress = Arc<dyn Fn(&str, &str, u32) + Send + Sync>;

/// Reasons a batch cannot start at all.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The input folder does not exist.
    #[error("Input folder '{0}' not found")]
    InputMissing(PathBuf),

    /// The input folder has no eligible projects.
    #[error("No .{extension} files found in '{}'", .dir.display())]
    NoProjects { dir: PathBuf, extension: String },

    /// The editor cannot be launched (e.g. executable missing).
    #[error("Editor unavailable: {0}")]
    EditorUnavailable(#[source] EditorError),

    /// The input folder could not be scanned.
    #[error(transparent)]
    Discovery(DiscoveryError),

    /// Output or logs folder could not be prepared.
    #[error("Failed to prepare {what}: {source}")]
    Setup {
        what: String,
        #[source]
        source: io::Error,
    },
}

impl From<DiscoveryError> for BatchError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::InputMissing(path) => BatchError::InputMissing(path),
            other => BatchError::Discovery(other),
        }
    }
}

/// Runs a folder of projects through the editor.
///
/// # Example
///
/// ```ignore
/// let processor = BatchProcessor::new(settings)?;
/// let report = processor.run(&AudacityLauncher::new(settings.editor.clone()))?;
/// println!("{} succeeded, {} failed", report.succeeded(), report.failed());
/// ```
pub struct BatchProcessor {
    /// Application settings.
    settings: Settings,
    input_dir: PathBuf,
    /// Absolute, so export paths do not depend on the editor's working folder.
    output_dir: PathBuf,
    logs_dir: PathBuf,
    console: Option<SharedConsole>,
    progress: Option<BatchProgress>,
}

impl BatchProcessor {
    /// Create a processor for the folders named in `settings.paths`.
    pub fn new(settings: Settings) -> io::Result<Self> {
        let input_dir = absolute(Path::new(&settings.paths.input_folder))?;
        let output_dir = absolute(Path::new(&settings.paths.output_folder))?;
        let logs_dir = absolute(Path::new(&settings.paths.logs_folder))?;
        Ok(Self {
            settings,
            input_dir,
            output_dir,
            logs_dir,
            console: None,
            progress: None,
        })
    }

    /// Mirror every project log line to `console`.
    pub fn with_console(mut self, console: SharedConsole) -> Self {
        self.console = Some(console);
        self
    }

    pub fn with_progress(mut self, progress: BatchProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Projects in processing order.
    pub fn discover(&self) -> Result<Vec<ProjectFile>, BatchError> {
        let projects = discover_projects(&self.input_dir, &self.settings.paths.input_extension)?;
        if projects.is_empty() {
            return Err(BatchError::NoProjects {
                dir: self.input_dir.clone(),
                extension: self.settings.paths.input_extension.clone(),
            });
        }
        Ok(projects)
    }

    /// Export path for one project.
    pub fn output_path(&self, project: &ProjectFile) -> PathBuf {
        output_path_for(
            project,
            &self.output_dir,
            &self.settings.export,
            &self.settings.paths.input_extension,
        )
    }

    /// Process every project in the input folder.
    ///
    /// Fails before launching anything when the input folder is missing or
    /// empty, or when the launcher's preflight check fails. Once projects
    /// are running, a failed project is recorded and the batch continues.
    pub fn run(&self, launcher: &dyn EditorLauncher) -> Result<BatchReport, BatchError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| BatchError::Setup {
            what: format!("output folder {}", self.output_dir.display()),
            source,
        })?;

        let projects = self.discover()?;
        launcher.preflight().map_err(BatchError::EditorUnavailable)?;

        std::fs::create_dir_all(&self.logs_dir).map_err(|source| BatchError::Setup {
            what: format!("logs folder {}", self.logs_dir.display()),
            source,
        })?;

        let total = projects.len();
        tracing::info!("Processing {} project(s) from {}", total, self.input_dir.display());

        let mut report = BatchReport::new(&self.input_dir, &self.output_dir);
        for (i, project) in projects.iter().enumerate() {
            tracing::info!("Processing project {}/{}: {}", i + 1, total, project.name);

            let result = self.process_project(project, launcher, i + 1, total);
            match result.status {
                ProjectStatus::Succeeded => {
                    tracing::info!("{} finished", project.name)
                }
                ProjectStatus::Skipped => tracing::info!("{} skipped", project.name),
                ProjectStatus::Failed => tracing::warn!(
                    "{} failed: {}",
                    project.name,
                    result.message.as_deref().unwrap_or("unknown error")
                ),
            }
            report.push(result);

            let pause = self.settings.pacing.between_files();
            if i + 1 < total && !pause.is_zero() {
                thread::sleep(pause);
            }
        }
        report.finish();

        if self.settings.logging.write_report {
            match report.write_json(&self.logs_dir) {
                Ok(path) => tracing::info!("Report written to {}", path.display()),
                Err(e) => tracing::warn!("Failed to write batch report: {}", e),
            }
        }

        Ok(report)
    }

    /// Launch, run the pipeline, and close, for one project.
    ///
    /// Exactly one launch attempt and, if it succeeded, exactly one close
    /// happen here, whatever the pipeline does.
    pub fn process_project(
        &self,
        project: &ProjectFile,
        launcher: &dyn EditorLauncher,
        index: usize,
        total: usize,
    ) -> ProjectResult {
        let started = Instant::now();
        let mut result = ProjectResult::new(&project.name, &project.path);
        let job_name = project.stem();

        let logger = match JobLogger::new(
            &job_name,
            &self.logs_dir,
            LogConfig::from(&self.settings.logging),
            self.console_callback(),
        ) {
            Ok(l) => Arc::new(l),
            Err(e) => {
                result.message = Some(format!("Failed to create logger: {}", e));
                return result;
            }
        };
        result.log_path = Some(logger.log_path().to_path_buf());

        logger.section(&format!("[{}/{}] {}", index, total, project.name));
        let output_path = self.output_path(project);

        let session = match launcher.launch(&project.path, Arc::clone(&logger)) {
            Ok(session) => session,
            Err(e) => {
                logger.error(&format!("Could not open {}: {}", project.name, e));
                logger.info("No editor running, nothing to close");
                logger.show_tail("Last editor output");
                result.message = Some(e.to_string());
                result.duration_secs = started.elapsed().as_secs_f64();
                return result;
            }
        };
        let mut guard = SessionGuard {
            session,
            logger: Arc::clone(&logger),
        };

        let mut ctx = Context::new(
            self.settings.clone(),
            project.clone(),
            output_path.clone(),
            Arc::clone(&logger),
        );
        if let Some(progress) = &self.progress {
            let progress = Arc::clone(progress);
            let name = project.name.clone();
            ctx = ctx.with_progress_callback(Box::new(move |step, percent, _message| {
                progress(&name, step, percent)
            }));
        }

        let mut state = JobState::new(&job_name);
        let pipeline = create_standard_pipeline();
        let run = pipeline.run(&ctx, guard.session(), &mut state);

        if let Err(e) = &run {
            if e.editor_error().map_or(false, EditorError::is_fatal_for_session) {
                logger.warn("Editor stopped answering; it will be terminated");
            }
        }

        match guard.close() {
            Ok(outcome) => result.close = Some(outcome),
            Err(e) => logger.error(&format!("Failed to close the editor: {}", e)),
        }

        match run {
            Ok(run_result) => {
                result.steps_completed = run_result.steps_completed;
                if let Some(export) = &state.export {
                    result.status = ProjectStatus::Succeeded;
                    result.output_path = Some(export.output_path.clone());
                    logger.success(&format!("Saved {}", export.output_path.display()));
                } else {
                    result.status = ProjectStatus::Skipped;
                    result.message = Some(format!(
                        "{} already exists and overwrite is off",
                        output_path.display()
                    ));
                }
            }
            Err(e) => {
                logger.error(&e.to_string());
                logger.show_tail("Last editor replies");
                result.message = Some(e.to_string());
            }
        }

        result.state = Some(state);
        result.duration_secs = started.elapsed().as_secs_f64();
        logger.flush();
        result
    }

    fn console_callback(&self) -> Option<ConsoleCallback> {
        self.console.as_ref().map(|console| {
            let console = Arc::clone(console);
            Box::new(move |line: &str| console(line)) as ConsoleCallback
        })
    }
}

/// Owns an open session and closes it when dropped.
struct SessionGuard {
    session: Box<dyn EditorSession>,
    logger: Arc<JobLogger>,
}

impl SessionGuard {
    fn session(&mut self) -> &mut dyn EditorSession {
        self.session.as_mut()
    }

    fn close(&mut self) -> EditorResult<CloseOutcome> {
        self.session.close()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.session.is_closed() {
            if let Err(e) = self.session.close() {
                self.logger
                    .error(&format!("Failed to close the editor: {}", e));
            }
        }
    }
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::testing::{Event, MockLauncher};
    use crate::orchestrator::fixtures;
    use std::fs;

    struct Workspace {
        dir: tempfile::TempDir,
        settings: Settings,
    }

    impl Workspace {
        fn new(projects: &[&str]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let input = dir.path().join("input");
            fs::create_dir(&input).unwrap();
            for name in projects {
                fs::write(input.join(name), b"SQLite").unwrap();
            }

            let mut settings = fixtures::fast_settings();
            settings.paths.input_folder = input.to_string_lossy().to_string();
            settings.paths.output_folder = dir.path().join("output").to_string_lossy().to_string();
            settings.paths.logs_folder = dir.path().join(".logs").to_string_lossy().to_string();
            Self { dir, settings }
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.dir.path().join(rel)
        }

        fn processor(&self) -> BatchProcessor {
            BatchProcessor::new(self.settings.clone()).unwrap()
        }
    }

    #[test]
    fn missing_input_folder_launches_nothing() {
        let ws = Workspace::new(&[]);
        fs::remove_dir(ws.path("input")).unwrap();
        let launcher = MockLauncher::new();

        let err = ws.processor().run(&launcher).unwrap_err();
        assert!(matches!(err, BatchError::InputMissing(_)));
        assert!(launcher.events().is_empty());
        assert!(ws.path("output").is_dir());
    }

    #[test]
    fn empty_input_folder_launches_nothing() {
        let ws = Workspace::new(&["notes.txt"]);
        let launcher = MockLauncher::new();

        let err = ws.processor().run(&launcher).unwrap_err();
        assert!(matches!(err, BatchError::NoProjects { .. }));
        assert!(launcher.events().is_empty());
    }

    #[test]
    fn missing_editor_stops_before_any_launch() {
        let ws = Workspace::new(&["a.aup3"]);
        let launcher = MockLauncher {
            missing_executable: true,
            ..MockLauncher::default()
        };

        let err = ws.processor().run(&launcher).unwrap_err();
        assert!(matches!(err, BatchError::EditorUnavailable(_)));
        assert!(launcher.events().is_empty());
    }

    #[test]
    fn processes_projects_in_order_one_editor_at_a_time() {
        let ws = Workspace::new(&["b.aup3", "a.aup3"]);
        let launcher = MockLauncher::new();

        let report = ws.processor().run(&launcher).unwrap();
        assert_eq!(report.succeeded(), 2);
        assert!(!report.has_failures());
        assert!(ws.path("output/a_processed.wav").is_file());
        assert!(ws.path("output/b_processed.wav").is_file());

        let a = ws.path("input/a.aup3");
        let b = ws.path("input/b.aup3");
        let lifecycle: Vec<Event> = launcher
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Launch(_) | Event::Close(_)))
            .collect();
        assert_eq!(
            lifecycle,
            vec![
                Event::Launch(a.clone()),
                Event::Close(a),
                Event::Launch(b.clone()),
                Event::Close(b),
            ]
        );

        let commands = launcher.commands();
        assert_eq!(commands.len(), 12);
        assert_eq!(
            &commands[..5],
            &[
                "SelectTime: Start=\"0\" End=\"5\"",
                "NoiseReduction: GetProfile=\"1\"",
                "SelectAll",
                "Macro_NoiseReductionPython",
                "Macro_CompressorPython",
            ]
        );
        assert!(commands[5].starts_with("Export2: Filename="));
        assert!(commands[5].ends_with("a_processed.wav\" NumChannels=2"));
    }

    #[test]
    fn extension_spelled_differently_is_not_a_project() {
        let ws = Workspace::new(&["a.aup3", "a.AUP3"]);
        let launcher = MockLauncher::new();

        let report = ws.processor().run(&launcher).unwrap();
        assert_eq!(report.total(), 1);
        assert_eq!(report.results[0].project, "a.aup3");
        assert_eq!(report.results[0].close, Some(CloseOutcome::Exited));

        let launches: Vec<Event> = launcher
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Launch(_)))
            .collect();
        assert_eq!(launches, vec![Event::Launch(ws.path("input/a.aup3"))]);
        assert!(ws.path("output/a_processed.wav").is_file());

        let outputs: Vec<String> = fs::read_dir(ws.path("output"))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(outputs, vec!["a_processed.wav"]);
    }

    #[test]
    fn failed_project_is_closed_and_batch_continues() {
        let ws = Workspace::new(&["a.aup3", "b.aup3"]);
        let launcher = MockLauncher {
            fail_command: Some("Macro_NoiseReductionPython".to_string()),
            fail_command_for: Some("a.aup3".to_string()),
            ..MockLauncher::default()
        };

        let report = ws.processor().run(&launcher).unwrap();
        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);

        let failed = &report.results[0];
        assert!(failed.is_failure());
        assert!(failed.message.as_deref().unwrap().contains("NoiseReduction"));
        assert_eq!(failed.close, Some(CloseOutcome::Exited));
        assert!(!ws.path("output/a_processed.wav").exists());
        assert!(ws.path("output/b_processed.wav").is_file());

        // Nothing after the failing command is sent for `a`.
        let events = launcher.events();
        let close_a = events
            .iter()
            .position(|e| *e == Event::Close(ws.path("input/a.aup3")))
            .unwrap();
        assert_eq!(
            events[close_a - 1],
            Event::Command("Macro_NoiseReductionPython".to_string())
        );
    }

    #[test]
    fn failed_launch_has_nothing_to_close() {
        let ws = Workspace::new(&["a.aup3", "b.aup3"]);
        let launcher = MockLauncher {
            fail_launch_for: Some("a.aup3".to_string()),
            ..MockLauncher::default()
        };

        let report = ws.processor().run(&launcher).unwrap();
        assert_eq!(report.failed(), 1);
        assert_eq!(report.results[0].close, None);
        assert_eq!(report.results[1].close, Some(CloseOutcome::Exited));

        let a = ws.path("input/a.aup3");
        let events = launcher.events();
        assert!(!events.contains(&Event::Close(a)));
        assert_eq!(
            events.iter().filter(|e| matches!(e, Event::Close(_))).count(),
            1
        );
    }

    #[test]
    fn existing_output_is_deleted_before_export() {
        let ws = Workspace::new(&["track1.aup3"]);
        fs::create_dir_all(ws.path("output")).unwrap();
        fs::write(ws.path("output/track1_processed.wav"), b"stale").unwrap();
        let launcher = MockLauncher::new();

        let report = ws.processor().run(&launcher).unwrap();
        assert_eq!(report.succeeded(), 1);
        assert!(!launcher
            .events()
            .iter()
            .any(|e| matches!(e, Event::ExportOverExisting(_))));
        assert_eq!(
            fs::read(ws.path("output/track1_processed.wav")).unwrap(),
            b"RIFF"
        );
    }

    #[test]
    fn existing_output_without_overwrite_is_skipped() {
        let mut ws = Workspace::new(&["track1.aup3"]);
        ws.settings.export.overwrite = false;
        fs::create_dir_all(ws.path("output")).unwrap();
        fs::write(ws.path("output/track1_processed.wav"), b"keep").unwrap();
        let launcher = MockLauncher::new();

        let report = ws.processor().run(&launcher).unwrap();
        assert_eq!(report.skipped(), 1);
        assert!(!report.has_failures());
        assert_eq!(report.results[0].close, Some(CloseOutcome::Exited));
        assert_eq!(
            fs::read(ws.path("output/track1_processed.wav")).unwrap(),
            b"keep"
        );
    }

    #[test]
    fn writes_logs_and_report() {
        let ws = Workspace::new(&["a.aup3"]);
        let lines = Arc::new(parking_lot::Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&lines);
        let launcher = MockLauncher::new();

        let report = ws
            .processor()
            .with_console(Arc::new(move |line: &str| sink.lock().push(line.to_string())))
            .run(&launcher)
            .unwrap();

        let log_path = report.results[0].log_path.clone().unwrap();
        assert!(log_path.is_file());
        assert!(lines.lock().iter().any(|l| l.contains("[1/1] a.aup3")));

        let reports: Vec<_> = fs::read_dir(ws.path(".logs"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("batch_report_"))
            .collect();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn relative_folders_become_absolute() {
        let mut settings = fixtures::fast_settings();
        settings.paths.output_folder = "output".to_string();
        let processor = BatchProcessor::new(settings).unwrap();
        assert!(processor.output_dir().is_absolute());
        assert!(processor.output_dir().ends_with("output"));
    }
}
