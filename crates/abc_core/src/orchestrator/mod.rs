//! Pipeline orchestrator for cleaning one project at a time.
//!
//! Each project runs through a sequence of steps against a single open
//! editor session. Steps validate, send their commands, and record what
//! they did in the `JobState`.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── per project: launch → Pipeline → close
//!             ├── Step: NoiseProfile
//!             ├── Step: SelectAll
//!             ├── Step: NoiseReduction
//!             ├── Step: Compression
//!             └── Step: Export
//! ```
//!
//! # Example
//!
//! ```ignore
//! use abc_core::orchestrator::{create_standard_pipeline, Context, JobState};
//!
//! let ctx = Context::new(settings, project, output_path, logger);
//! let mut state = JobState::new("track1");
//!
//! let pipeline = create_standard_pipeline();
//! let result = pipeline.run(&ctx, session.as_mut(), &mut state)?;
//! println!("Completed: {:?}", result.steps_completed);
//! ```

mod batch_processor;
mod errors;
mod pipeline;
mod report;
mod step;
pub mod steps;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use batch_processor::{BatchError, BatchProcessor, BatchProgress, SharedConsole};
pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use report::{BatchReport, ProjectResult, ProjectStatus};
pub use step::PipelineStep;
pub use steps::{CompressionStep, ExportStep, NoiseProfileStep, NoiseReductionStep, SelectAllStep};
pub use types::{
    Context, EffectRecord, ExportOutput, JobState, NoiseProfileOutput, ProgressCallback,
    StepOutcome,
};

/// Create a standard pipeline with all steps in the correct order.
///
/// The standard pipeline executes these steps:
/// 1. NoiseProfile - select the leading sample and capture the profile
/// 2. SelectAll - select the whole project
/// 3. NoiseReduction - run the noise reduction macro
/// 4. Compression - run the compression macro or built-in compressor
/// 5. Export - delete any previous output and export
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(NoiseProfileStep::new())
        .with_step(SelectAllStep::new())
        .with_step(NoiseReductionStep::new())
        .with_step(CompressionStep::new())
        .with_step(ExportStep::new())
}
