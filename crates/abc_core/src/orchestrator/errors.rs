//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Project → Step → Command → Detail

use std::io;

use thiserror::Error;

use crate::editor::EditorError;

/// Top-level pipeline error with project context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("Project '{job_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        job_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Failed to set up the project (logger, output folder).
    #[error("Project '{job_name}' setup failed: {message}")]
    SetupFailed { job_name: String, message: String },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        job_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            job_name: job_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(job_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            job_name: job_name.into(),
            message: message.into(),
        }
    }

    /// The editor error behind this failure, if any.
    pub fn editor_error(&self) -> Option<&EditorError> {
        match self {
            PipelineError::StepFailed {
                source: StepError::Editor(e),
                ..
            } => Some(e),
            _ => None,
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// The editor rejected a command or stopped answering.
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_displays_editor_failure() {
        let err: StepError = EditorError::command_failed("Macro_CompressorPython", "Failed!").into();
        let msg = err.to_string();
        assert!(msg.contains("Macro_CompressorPython"));
        assert!(msg.contains("Failed!"));
    }

    #[test]
    fn pipeline_error_chains_context() {
        let step_err = StepError::from(EditorError::ChannelClosed);
        let pipeline_err = PipelineError::step_failed("track1", "NoiseProfile", step_err);

        let msg = pipeline_err.to_string();
        assert!(msg.contains("track1"));
        assert!(msg.contains("NoiseProfile"));
        assert!(matches!(
            pipeline_err.editor_error(),
            Some(EditorError::ChannelClosed)
        ));
    }
}
