//! In-memory editor used by tests.
//!
//! Records every launch, command and close so tests can assert on the
//! exact interaction with the editor.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::logging::JobLogger;

use super::command::ScriptCommand;
use super::types::{CloseOutcome, EditorError, EditorResult, Reply};
use super::{EditorLauncher, EditorSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Launch(PathBuf),
    Command(String),
    /// An `Export2` target that already existed when the command arrived.
    ExportOverExisting(PathBuf),
    Close(PathBuf),
}

#[derive(Default)]
pub struct MockLauncher {
    pub events: Arc<Mutex<Vec<Event>>>,
    /// Preflight fails with `ExecutableNotFound`.
    pub missing_executable: bool,
    /// Launch fails for projects whose file name contains this text.
    pub fail_launch_for: Option<String>,
    /// Commands starting with this text get a `Failed!` status.
    pub fail_command: Option<String>,
    /// Fail commands only while this project is open.
    pub fail_command_for: Option<String>,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Command(c) => Some(c),
                _ => None,
            })
            .collect()
    }
}

fn name_contains(path: &Path, needle: &str) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().contains(needle))
        .unwrap_or(false)
}

impl EditorLauncher for MockLauncher {
    fn preflight(&self) -> EditorResult<()> {
        if self.missing_executable {
            return Err(EditorError::ExecutableNotFound(PathBuf::from(
                "/nonexistent/audacity",
            )));
        }
        Ok(())
    }

    fn launch(&self, project: &Path, logger: Arc<JobLogger>) -> EditorResult<Box<dyn EditorSession>> {
        if let Some(needle) = &self.fail_launch_for {
            if name_contains(project, needle) {
                return Err(EditorError::NotReady {
                    waited: std::time::Duration::from_secs(1),
                });
            }
        }

        self.events.lock().push(Event::Launch(project.to_path_buf()));
        logger.info("mock editor launched");

        let fail_command = match &self.fail_command_for {
            Some(needle) if !name_contains(project, needle) => None,
            _ => self.fail_command.clone(),
        };

        Ok(Box::new(MockSession {
            events: Arc::clone(&self.events),
            project: project.to_path_buf(),
            fail_command,
            closed: false,
        }))
    }
}

pub struct MockSession {
    events: Arc<Mutex<Vec<Event>>>,
    project: PathBuf,
    fail_command: Option<String>,
    closed: bool,
}

impl EditorSession for MockSession {
    fn send(&mut self, command: &ScriptCommand) -> EditorResult<Reply> {
        if self.closed {
            return Err(EditorError::SessionClosed);
        }
        command.validate()?;

        let line = command.render();
        self.events.lock().push(Event::Command(line.clone()));

        if let Some(prefix) = &self.fail_command {
            if line.starts_with(prefix.as_str()) {
                return Err(EditorError::command_failed(command.name(), "Failed!"));
            }
        }

        if let ScriptCommand::Export2 { filename, .. } = command {
            if filename.exists() {
                self.events
                    .lock()
                    .push(Event::ExportOverExisting(filename.clone()));
            }
            std::fs::write(filename, b"RIFF")
                .map_err(|e| EditorError::io("writing mock export", e))?;
        }

        Ok(Reply::ok(Vec::new()))
    }

    fn close(&mut self) -> EditorResult<CloseOutcome> {
        if self.closed {
            return Ok(CloseOutcome::NothingToClose);
        }
        self.closed = true;
        self.events.lock().push(Event::Close(self.project.clone()));
        Ok(CloseOutcome::Exited)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
