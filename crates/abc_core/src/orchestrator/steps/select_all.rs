//! SelectAll step - selects every track from start to end.

use crate::editor::{EditorSession, ScriptCommand};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

pub struct SelectAllStep;

impl SelectAllStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SelectAllStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SelectAllStep {
    fn name(&self) -> &str {
        "SelectAll"
    }

    fn description(&self) -> &str {
        "Select the whole project"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(
        &self,
        _ctx: &Context,
        editor: &mut dyn EditorSession,
        state: &mut JobState,
    ) -> StepResult<StepOutcome> {
        editor.send(&ScriptCommand::SelectAll)?;
        state.selected_all = true;
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.selected_all {
            return Err(StepError::invalid_output("Selection not recorded"));
        }
        Ok(())
    }
}
