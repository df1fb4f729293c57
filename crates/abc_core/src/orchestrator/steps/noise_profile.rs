//! NoiseProfile step - teaches the editor what the background noise sounds like.
//!
//! Selects the leading sample window, which should contain only room
//! tone, and captures it as the noise profile for the reduction effect.

use crate::editor::{EditorSession, ScriptCommand};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, NoiseProfileOutput, StepOutcome};

/// Noise profile capture step.
pub struct NoiseProfileStep;

impl NoiseProfileStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoiseProfileStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for NoiseProfileStep {
    fn name(&self) -> &str {
        "NoiseProfile"
    }

    fn description(&self) -> &str {
        "Capture noise profile from the leading sample"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let noise = &ctx.settings.noise;
        if !(noise.sample_start_secs >= 0.0) || !(noise.sample_duration_secs > 0.0) {
            return Err(StepError::invalid_input(format!(
                "noise sample window {}s + {}s is not usable",
                noise.sample_start_secs, noise.sample_duration_secs
            )));
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &Context,
        editor: &mut dyn EditorSession,
        state: &mut JobState,
    ) -> StepResult<StepOutcome> {
        let noise = &ctx.settings.noise;
        let start = noise.sample_start_secs;
        let end = noise.sample_end_secs();

        ctx.logger.info(&format!(
            "Selecting noise sample {}s to {}s",
            start, end
        ));
        editor.send(&ScriptCommand::select_time(start, end))?;
        editor.send(&ScriptCommand::GetNoiseProfile)?;

        state.noise_profile = Some(NoiseProfileOutput {
            start_secs: start,
            end_secs: end,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.has_noise_profile() {
            return Err(StepError::invalid_output("Noise profile not recorded"));
        }
        Ok(())
    }
}
