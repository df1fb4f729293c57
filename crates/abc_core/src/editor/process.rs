//! Editor process lifecycle.
//!
//! Starts the editor with a project argument and stops it again without
//! saving. A process that is dropped without being terminated is killed.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::types::{CloseOutcome, EditorError, EditorResult};

/// One running editor instance.
pub struct EditorProcess {
    child: Child,
    /// Set once the child has been reaped.
    status: Option<ExitStatus>,
}

impl EditorProcess {
    /// Check that the executable exists.
    pub fn locate(path: impl AsRef<Path>) -> EditorResult<PathBuf> {
        let path = path.as_ref();
        if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(EditorError::ExecutableNotFound(path.to_path_buf()))
        }
    }

    /// Start the editor with `project` as its only argument.
    pub fn spawn(executable: &Path, project: &Path) -> EditorResult<Self> {
        tracing::debug!(
            "Running: {} {}",
            executable.display(),
            project.display()
        );

        let child = Command::new(executable)
            .arg(project)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EditorError::SpawnFailed {
                executable: executable.to_path_buf(),
                source,
            })?;

        tracing::debug!("Editor started with pid {}", child.id());

        Ok(Self {
            child,
            status: None,
        })
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Exit status if the process has already exited.
    pub fn has_exited(&mut self) -> EditorResult<Option<ExitStatus>> {
        if self.status.is_some() {
            return Ok(self.status);
        }
        self.status = self
            .child
            .try_wait()
            .map_err(|e| EditorError::io("checking the editor process", e))?;
        Ok(self.status)
    }

    /// Ask the editor to exit, then force it after `grace`.
    ///
    /// Blocks until the process is gone. Nothing is saved.
    pub fn terminate(&mut self, grace: Duration, poll: Duration) -> EditorResult<CloseOutcome> {
        if self.has_exited()?.is_some() {
            return Ok(CloseOutcome::AlreadyExited);
        }

        if request_exit(self.pid()) {
            let deadline = Instant::now() + grace;
            while Instant::now() < deadline {
                if self.has_exited()?.is_some() {
                    return Ok(CloseOutcome::Exited);
                }
                thread::sleep(poll);
            }
            tracing::warn!(
                "Editor (pid {}) still running after {}s, killing it",
                self.pid(),
                grace.as_secs()
            );
        }

        // Kill fails if the process exited in the meantime; wait() settles it.
        let _ = self.child.kill();
        let status = self
            .child
            .wait()
            .map_err(|e| EditorError::io("waiting for the editor to exit", e))?;
        self.status = Some(status);
        Ok(CloseOutcome::Killed)
    }
}

impl Drop for EditorProcess {
    fn drop(&mut self) {
        if self.status.is_none() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Send SIGTERM. Returns false when no graceful request could be made.
#[cfg(unix)]
fn request_exit(pid: u32) -> bool {
    match Command::new("kill")
        .arg("-TERM")
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => status.success(),
        Err(e) => {
            tracing::debug!("kill -TERM {} failed: {}", pid, e);
            false
        }
    }
}

/// Windows has no graceful signal for GUI processes; terminate directly.
#[cfg(not(unix))]
fn request_exit(_pid: u32) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_reported() {
        let result = EditorProcess::locate("/nonexistent/audacity");
        assert!(matches!(result, Err(EditorError::ExecutableNotFound(_))));
    }

    #[test]
    fn directory_is_not_an_executable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EditorProcess::locate(dir.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn terminate_stops_running_process() {
        let sleep = EditorProcess::locate("/bin/sleep")
            .or_else(|_| EditorProcess::locate("/usr/bin/sleep"))
            .unwrap();
        let mut process = EditorProcess::spawn(&sleep, Path::new("30")).unwrap();
        assert!(process.has_exited().unwrap().is_none());

        let outcome = process
            .terminate(Duration::from_secs(5), Duration::from_millis(20))
            .unwrap();
        assert_eq!(outcome, CloseOutcome::Exited);

        let again = process
            .terminate(Duration::from_secs(1), Duration::from_millis(20))
            .unwrap();
        assert_eq!(again, CloseOutcome::AlreadyExited);
    }

    #[cfg(unix)]
    #[test]
    fn exited_process_is_detected() {
        let truth = EditorProcess::locate("/bin/true")
            .or_else(|_| EditorProcess::locate("/usr/bin/true"))
            .unwrap();
        let mut process = EditorProcess::spawn(&truth, Path::new("ignored")).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while process.has_exited().unwrap().is_none() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(process.has_exited().unwrap().is_some());
    }
}
