//! Export step - writes the cleaned audio next to the other outputs.
//!
//! An existing file at the output path is deleted first, so the editor
//! never has to deal with it. With `export.overwrite = false` the project
//! is skipped instead.

use std::fs;

use crate::editor::{EditorSession, ScriptCommand};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, ExportOutput, JobState, StepOutcome};

pub struct ExportStep;

impl ExportStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExportStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ExportStep {
    fn name(&self) -> &str {
        "Export"
    }

    fn description(&self) -> &str {
        "Export processed audio"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        match ctx.output_path.parent() {
            Some(dir) if dir.is_dir() => Ok(()),
            Some(dir) => Err(StepError::precondition_failed(format!(
                "output folder {} does not exist",
                dir.display()
            ))),
            None => Err(StepError::invalid_input(format!(
                "output path {} has no folder",
                ctx.output_path.display()
            ))),
        }
    }

    fn execute(
        &self,
        ctx: &Context,
        editor: &mut dyn EditorSession,
        state: &mut JobState,
    ) -> StepResult<StepOutcome> {
        let output = &ctx.output_path;
        let export = &ctx.settings.export;

        let mut replaced_existing = false;
        if output.exists() {
            if !export.overwrite {
                return Ok(StepOutcome::Skipped(format!(
                    "{} already exists",
                    output.display()
                )));
            }
            ctx.logger
                .info(&format!("Deleting existing file: {}", output.display()));
            fs::remove_file(output)
                .map_err(|e| StepError::io_error("deleting the previous export", e))?;
            replaced_existing = true;
        }

        ctx.logger.info(&format!("Exporting to {}", output.display()));
        editor.send(&ScriptCommand::export(output, export.num_channels))?;

        state.export = Some(ExportOutput {
            output_path: output.clone(),
            num_channels: export.num_channels,
            replaced_existing,
        });
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        if !state.has_export() {
            return Err(StepError::invalid_output("Export not recorded"));
        }
        if !ctx.output_path.exists() {
            ctx.logger.warn(&format!(
                "Editor acknowledged the export but {} is not there yet",
                ctx.output_path.display()
            ));
        }
        Ok(())
    }
}
