//! Error and reply types for editor automation.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while launching, scripting, or closing the editor.
#[derive(Error, Debug)]
pub enum EditorError {
    /// The configured executable does not exist.
    #[error("Audacity not found at {0}. Please update editor.executable.")]
    ExecutableNotFound(PathBuf),

    /// The executable exists but could not be started.
    #[error("Failed to start {executable}: {source}")]
    SpawnFailed {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The editor exited before its scripting pipe answered.
    #[error("Audacity exited during startup (exit code {code:?})")]
    ExitedEarly { code: Option<i32> },

    /// The scripting pipe never became usable.
    #[error("Audacity did not answer on the scripting pipe within {}s", .waited.as_secs())]
    NotReady { waited: Duration },

    /// A command got no complete reply in time.
    #[error("No reply to '{command}' within {}s", .waited.as_secs())]
    Timeout { command: String, waited: Duration },

    /// The editor acknowledged the command with a failure status.
    #[error("'{command}' failed: {status}")]
    CommandFailed { command: String, status: String },

    /// The reply pipe closed in the middle of a reply.
    #[error("Scripting pipe closed while waiting for a reply")]
    ChannelClosed,

    /// A command was sent after the session was closed.
    #[error("Editor session is already closed")]
    SessionClosed,

    /// A command argument cannot be expressed in the script syntax.
    #[error("Invalid command argument: {0}")]
    InvalidArgument(String),

    /// I/O failure on the pipe or process.
    #[error("I/O error while {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl EditorError {
    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a command failed error.
    pub fn command_failed(command: impl Into<String>, status: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            status: status.into(),
        }
    }

    /// Whether the session can no longer be trusted after this error.
    pub fn is_fatal_for_session(&self) -> bool {
        matches!(
            self,
            EditorError::Timeout { .. } | EditorError::ChannelClosed | EditorError::Io { .. }
        )
    }
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Status line that ends every reply on the scripting pipe.
pub const STATUS_PREFIX: &str = "BatchCommand finished: ";

/// Final status of a scripted command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyStatus {
    Ok,
    Failed(String),
}

impl ReplyStatus {
    /// Parse the text after `BatchCommand finished: `.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text == "OK" {
            ReplyStatus::Ok
        } else {
            ReplyStatus::Failed(text.to_string())
        }
    }
}

/// A complete reply from the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Body lines before the status line.
    pub lines: Vec<String>,
    pub status: ReplyStatus,
}

impl Reply {
    /// A successful reply with the given body.
    pub fn ok(lines: Vec<String>) -> Self {
        Self {
            lines,
            status: ReplyStatus::Ok,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ReplyStatus::Ok
    }

    /// Body joined with newlines.
    pub fn body(&self) -> String {
        self.lines.join("\n")
    }

    /// Turn a failed status into an error naming the command.
    pub fn into_result(self, command: &str) -> EditorResult<Reply> {
        match &self.status {
            ReplyStatus::Ok => Ok(self),
            ReplyStatus::Failed(status) => {
                let detail = if self.lines.is_empty() {
                    status.clone()
                } else {
                    format!("{} ({})", status, self.body())
                };
                Err(EditorError::command_failed(command, detail))
            }
        }
    }
}

/// How a session ended when it was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseOutcome {
    /// The editor exited after the termination request.
    Exited,
    /// The editor ignored the request and was killed.
    Killed,
    /// The editor was already gone.
    AlreadyExited,
    /// There was no running editor to close.
    NothingToClose,
}

impl std::fmt::Display for CloseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseOutcome::Exited => write!(f, "exited"),
            CloseOutcome::Killed => write!(f, "killed after timeout"),
            CloseOutcome::AlreadyExited => write!(f, "already exited"),
            CloseOutcome::NothingToClose => write!(f, "nothing to close"),
        }
    }
}
