//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use crate::editor::EditorSession;

use super::errors::StepResult;
use super::types::{Context, JobState, StepOutcome};

/// Trait for pipeline steps.
///
/// Each step in the pipeline implements this trait. The pipeline runner
/// calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Send the step's commands to the editor
/// 3. `validate_output` - Verify the step recorded its result
///
/// # Example
///
/// ```ignore
/// struct SelectAllStep;
///
/// impl PipelineStep for SelectAllStep {
///     fn name(&self) -> &str { "SelectAll" }
///
///     fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
///         Ok(())
///     }
///
///     fn execute(
///         &self,
///         ctx: &Context,
///         editor: &mut dyn EditorSession,
///         state: &mut JobState,
///     ) -> StepResult<StepOutcome> {
///         editor.send(&ScriptCommand::SelectAll)?;
///         state.selected_all = true;
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
///         if !state.selected_all {
///             return Err(StepError::invalid_output("Selection not recorded"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Validate inputs before execution.
    ///
    /// Called before `execute`. Should check that all required
    /// preconditions are met (settings usable, previous steps completed).
    fn validate_input(&self, ctx: &Context) -> StepResult<()>;

    /// Execute the step's main work against the open editor.
    ///
    /// Returns `StepOutcome::Success` on completion, or `StepOutcome::Skipped`
    /// if the step determined it should be skipped (not an error).
    fn execute(
        &self,
        ctx: &Context,
        editor: &mut dyn EditorSession,
        state: &mut JobState,
    ) -> StepResult<StepOutcome>;

    /// Validate outputs after execution.
    ///
    /// Called after `execute` returns `Success`.
    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
