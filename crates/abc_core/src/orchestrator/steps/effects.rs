//! Effect steps - noise reduction and compression over the whole selection.
//!
//! Noise reduction always runs as a user macro, because its parameters
//! cannot be passed through the scripting pipe. Compression runs either
//! as a macro or as the built-in `Compressor` command with the configured
//! parameters.

use crate::config::CompressionMode;
use crate::editor::{EditorSession, ScriptCommand};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, EffectRecord, JobState, StepOutcome};

/// Send `command` and record it as an applied effect.
fn apply_effect(
    step: &str,
    command: ScriptCommand,
    editor: &mut dyn EditorSession,
    state: &mut JobState,
) -> StepResult<StepOutcome> {
    editor.send(&command)?;
    state.effects.push(EffectRecord {
        step: step.to_string(),
        command: command.render(),
    });
    Ok(StepOutcome::Success)
}

fn check_applied(step: &str, state: &JobState) -> StepResult<()> {
    if !state.has_effect(step) {
        return Err(StepError::invalid_output(format!("{} not recorded", step)));
    }
    Ok(())
}

/// Runs the noise reduction macro using the captured profile.
pub struct NoiseReductionStep;

impl NoiseReductionStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoiseReductionStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for NoiseReductionStep {
    fn name(&self) -> &str {
        "NoiseReduction"
    }

    fn description(&self) -> &str {
        "Apply noise reduction"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.settings.noise.reduction_macro.trim().is_empty() {
            return Err(StepError::invalid_input("noise.reduction_macro is empty"));
        }
        Ok(())
    }

    fn execute(
        &self,
        ctx: &Context,
        editor: &mut dyn EditorSession,
        state: &mut JobState,
    ) -> StepResult<StepOutcome> {
        if !state.has_noise_profile() {
            return Err(StepError::precondition_failed(
                "no noise profile was captured",
            ));
        }

        let name = &ctx.settings.noise.reduction_macro;
        ctx.logger.info(&format!("Running macro '{}'", name));
        apply_effect(self.name(), ScriptCommand::run_macro(name), editor, state)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        check_applied(self.name(), state)
    }
}

/// Applies dynamic range compression.
pub struct CompressionStep;

impl CompressionStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CompressionStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for CompressionStep {
    fn name(&self) -> &str {
        "Compression"
    }

    fn description(&self) -> &str {
        "Apply compression"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let compression = &ctx.settings.compression;
        match compression.mode {
            CompressionMode::Macro if compression.macro_name.trim().is_empty() => Err(
                StepError::invalid_input("compression.macro_name is empty"),
            ),
            CompressionMode::Command if !(compression.ratio >= 1.0) => Err(
                StepError::invalid_input(format!(
                    "compression ratio {} is below 1",
                    compression.ratio
                )),
            ),
            _ => Ok(()),
        }
    }

    fn execute(
        &self,
        ctx: &Context,
        editor: &mut dyn EditorSession,
        state: &mut JobState,
    ) -> StepResult<StepOutcome> {
        let compression = &ctx.settings.compression;
        let command = match compression.mode {
            CompressionMode::Macro => {
                ctx.logger
                    .info(&format!("Running macro '{}'", compression.macro_name));
                ScriptCommand::run_macro(&compression.macro_name)
            }
            CompressionMode::Command => {
                ctx.logger.info(&format!(
                    "Compressor: threshold {} dB, ratio {}:1",
                    compression.threshold_db, compression.ratio
                ));
                ScriptCommand::compressor(compression)
            }
        };
        apply_effect(self.name(), command, editor, state)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        check_applied(self.name(), state)
    }
}
