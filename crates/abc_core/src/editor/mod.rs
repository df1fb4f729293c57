//! Editor automation: process lifecycle and the scripting channel.
//!
//! The batch driver only talks to the editor through two traits:
//!
//! ```text
//! EditorLauncher ──launch(project)──▶ EditorSession
//!                                        ├── send(ScriptCommand) -> Reply
//!                                        └── close()             -> CloseOutcome
//! ```
//!
//! `AudacityLauncher` is the real implementation: it starts Audacity with
//! the project, waits for `mod-script-pipe` to answer, and terminates the
//! process without saving when the session is closed.

mod audacity;
mod command;
mod pipe;
mod process;
mod types;

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;
use std::sync::Arc;

use crate::logging::JobLogger;

pub use audacity::{AudacityLauncher, AudacitySession};
pub(crate) use command::is_macro_name;
pub use command::{script_path, ScriptCommand};
pub use pipe::{PipePaths, ReplyAccumulator, ScriptPipe};
pub use process::EditorProcess;
pub use types::{
    CloseOutcome, EditorError, EditorResult, Reply, ReplyStatus, STATUS_PREFIX,
};

/// Starts editor sessions, one per project.
pub trait EditorLauncher {
    /// Check that launching can work at all (e.g. the executable exists).
    ///
    /// Runs once before any project is opened.
    fn preflight(&self) -> EditorResult<()> {
        Ok(())
    }

    /// Open `project` in a fresh editor instance and wait until it accepts
    /// commands.
    fn launch(&self, project: &Path, logger: Arc<JobLogger>) -> EditorResult<Box<dyn EditorSession>>;
}

/// A running editor instance with a connected scripting channel.
pub trait EditorSession {
    /// Send a command and wait for its reply.
    ///
    /// A reply with a failure status is returned as
    /// `EditorError::CommandFailed`.
    fn send(&mut self, command: &ScriptCommand) -> EditorResult<Reply>;

    /// Close the editor without saving the project.
    ///
    /// Closing twice is not an error; the second call reports
    /// `CloseOutcome::NothingToClose`.
    fn close(&mut self) -> EditorResult<CloseOutcome>;

    fn is_closed(&self) -> bool;
}
