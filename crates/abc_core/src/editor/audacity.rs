//! Audacity driven through `mod-script-pipe`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::config::EditorSettings;
use crate::logging::JobLogger;

use super::command::ScriptCommand;
use super::pipe::{PipePaths, ScriptPipe};
use super::process::EditorProcess;
use super::types::{CloseOutcome, EditorError, EditorResult, Reply};
use super::{EditorLauncher, EditorSession};

/// Text echoed back by the readiness probe.
const READY_PROBE: &str = "ready";

/// Launches Audacity with the configured executable and pipe names.
pub struct AudacityLauncher {
    settings: EditorSettings,
}

impl AudacityLauncher {
    pub fn new(settings: EditorSettings) -> Self {
        Self { settings }
    }
}

impl EditorLauncher for AudacityLauncher {
    fn preflight(&self) -> EditorResult<()> {
        let executable = EditorProcess::locate(&self.settings.executable)?;
        let paths = PipePaths::from_settings(&self.settings)?;
        tracing::debug!(
            "Editor: {} (pipes {} / {})",
            executable.display(),
            paths.to_editor.display(),
            paths.from_editor.display()
        );
        Ok(())
    }

    fn launch(&self, project: &Path, logger: Arc<JobLogger>) -> EditorResult<Box<dyn EditorSession>> {
        let executable = EditorProcess::locate(&self.settings.executable)?;
        let paths = PipePaths::from_settings(&self.settings)?;

        logger.info(&format!("Opening {} in Audacity...", project.display()));
        let started = Instant::now();
        let mut process = EditorProcess::spawn(&executable, project)?;

        let ready_timeout = self.settings.ready_timeout();
        let pipe = ScriptPipe::connect(&paths, ready_timeout, self.settings.poll_interval(), || {
            match process.has_exited()? {
                Some(status) => Err(EditorError::ExitedEarly {
                    code: status.code(),
                }),
                None => Ok(()),
            }
        })?;

        let mut session = AudacitySession {
            process: Some(process),
            pipe: Some(pipe),
            project: project.to_path_buf(),
            settings: self.settings.clone(),
            logger: Arc::clone(&logger),
        };

        // The pipes exist as soon as the module loads; the project may
        // still be opening, so wait for a command round trip.
        let remaining = ready_timeout.saturating_sub(started.elapsed());
        let probe = ScriptCommand::message(READY_PROBE);
        let reply = session.execute(&probe, remaining).map_err(|e| match e {
            EditorError::Timeout { .. } => EditorError::NotReady {
                waited: ready_timeout,
            },
            other => other,
        })?;
        reply.into_result(&probe.name())?;

        logger.success(&format!(
            "Audacity ready after {:.1}s",
            started.elapsed().as_secs_f64()
        ));
        Ok(Box::new(session))
    }
}

/// One Audacity instance with its project open.
///
/// Dropping an open session terminates the editor.
pub struct AudacitySession {
    process: Option<EditorProcess>,
    pipe: Option<ScriptPipe>,
    project: PathBuf,
    settings: EditorSettings,
    logger: Arc<JobLogger>,
}

impl AudacitySession {
    fn execute(&mut self, command: &ScriptCommand, timeout: std::time::Duration) -> EditorResult<Reply> {
        command.validate()?;
        let pipe = self.pipe.as_mut().ok_or(EditorError::SessionClosed)?;

        let line = command.render();
        self.logger.script(&line);
        let logger = &self.logger;
        pipe.execute(&line, timeout, |reply_line| logger.reply_line(reply_line))
    }
}

impl EditorSession for AudacitySession {
    fn send(&mut self, command: &ScriptCommand) -> EditorResult<Reply> {
        let reply = self.execute(command, self.settings.command_timeout())?;
        reply.into_result(&command.name())
    }

    fn close(&mut self) -> EditorResult<CloseOutcome> {
        // Closing our ends first lets the editor see EOF on its pipes.
        self.pipe = None;

        let Some(mut process) = self.process.take() else {
            return Ok(CloseOutcome::NothingToClose);
        };

        self.logger.info("Closing Audacity without saving...");
        let outcome = process.terminate(self.settings.close_timeout(), self.settings.poll_interval())?;
        match outcome {
            CloseOutcome::Killed => self.logger.warn(&format!("Audacity {}", outcome)),
            _ => self.logger.info(&format!("Audacity {}", outcome)),
        }
        Ok(outcome)
    }

    fn is_closed(&self) -> bool {
        self.process.is_none()
    }
}

impl Drop for AudacitySession {
    fn drop(&mut self) {
        if !self.is_closed() {
            if let Err(e) = self.close() {
                tracing::warn!("Failed to close Audacity for {}: {}", self.project.display(), e);
            }
        }
    }
}
