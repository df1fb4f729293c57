//! Pipeline runner that executes steps in sequence.

use std::thread;

use crate::editor::EditorSession;

use super::errors::{PipelineError, PipelineResult};
use super::step::PipelineStep;
use super::types::{Context, JobState, StepOutcome};

/// Pipeline that runs a sequence of steps against one editor session.
///
/// The pipeline executes steps in order, running validation before
/// and after each step, and stops at the first failure.
pub struct Pipeline {
    /// Steps to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run the pipeline with the given context, editor and state.
    ///
    /// Executes each step in order:
    /// 1. Run `validate_input`
    /// 2. Run `execute`
    /// 3. Run `validate_output` (if execute returned Success)
    /// 4. Pause for `pacing.settle_ms`
    pub fn run(
        &self,
        ctx: &Context,
        editor: &mut dyn EditorSession,
        state: &mut JobState,
    ) -> PipelineResult<PipelineRunResult> {
        let mut result = PipelineRunResult {
            steps_completed: Vec::new(),
            steps_skipped: Vec::new(),
        };

        let total_steps = self.steps.len();
        let settle = ctx.settings.pacing.settle();

        for (i, step) in self.steps.iter().enumerate() {
            let step_name = step.name();
            ctx.logger.phase(step.description());

            let percent = ((i as f64 / total_steps as f64) * 100.0) as u32;
            ctx.report_progress(step_name, percent, &format!("Starting {}", step_name));

            ctx.logger.debug(&format!("Validating input for '{}'", step_name));
            if let Err(e) = step.validate_input(ctx) {
                ctx.logger.error(&format!("Input validation failed: {}", e));
                return Err(PipelineError::step_failed(&ctx.job_name, step_name, e));
            }

            ctx.logger.debug(&format!("Executing '{}'", step_name));
            let outcome = step.execute(ctx, editor, state).map_err(|e| {
                ctx.logger.error(&format!("{} failed: {}", step_name, e));
                PipelineError::step_failed(&ctx.job_name, step_name, e)
            })?;

            match outcome {
                StepOutcome::Success => {
                    ctx.logger
                        .debug(&format!("Validating output for '{}'", step_name));
                    if let Err(e) = step.validate_output(ctx, state) {
                        ctx.logger.error(&format!("Output validation failed: {}", e));
                        return Err(PipelineError::step_failed(&ctx.job_name, step_name, e));
                    }

                    ctx.logger.success(&format!("{} completed", step_name));
                    result.steps_completed.push(step_name.to_string());
                }
                StepOutcome::Skipped(reason) => {
                    ctx.logger
                        .info(&format!("{} skipped: {}", step_name, reason));
                    result.steps_skipped.push(step_name.to_string());
                }
            }

            if !settle.is_zero() {
                thread::sleep(settle);
            }
        }

        ctx.report_progress("Complete", 100, "Pipeline finished");
        ctx.logger.success("Pipeline completed successfully");

        Ok(result)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineRunResult {
    /// Steps that completed successfully.
    pub steps_completed: Vec<String>,
    /// Steps that were skipped.
    pub steps_skipped: Vec<String>,
}

impl PipelineRunResult {
    /// Check if all steps completed (none skipped).
    pub fn all_completed(&self) -> bool {
        self.steps_skipped.is_empty()
    }

    /// Total number of steps that ran.
    pub fn total_steps(&self) -> usize {
        self.steps_completed.len() + self.steps_skipped.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::testing::MockLauncher;
    use crate::editor::{EditorLauncher, ScriptCommand};
    use crate::orchestrator::errors::{StepError, StepResult};
    use crate::orchestrator::fixtures;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Sends one message command, or skips, or fails.
    struct ProbeStep {
        name: &'static str,
        skip: bool,
        fail_validation: bool,
        runs: Arc<AtomicUsize>,
    }

    impl ProbeStep {
        fn new(name: &'static str, runs: &Arc<AtomicUsize>) -> Self {
            Self {
                name,
                skip: false,
                fail_validation: false,
                runs: Arc::clone(runs),
            }
        }
    }

    impl PipelineStep for ProbeStep {
        fn name(&self) -> &str {
            self.name
        }

        fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
            if self.fail_validation {
                return Err(StepError::invalid_input("not today"));
            }
            Ok(())
        }

        fn execute(
            &self,
            _ctx: &Context,
            editor: &mut dyn EditorSession,
            _state: &mut JobState,
        ) -> StepResult<StepOutcome> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.skip {
                return Ok(StepOutcome::Skipped("nothing to do".to_string()));
            }
            editor.send(&ScriptCommand::message(self.name))?;
            Ok(StepOutcome::Success)
        }

        fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
            Ok(())
        }
    }

    #[test]
    fn pipeline_builds_correctly() {
        let runs = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(ProbeStep::new("Step1", &runs))
            .with_step(ProbeStep::new("Step2", &runs));

        assert_eq!(pipeline.step_count(), 2);
        assert_eq!(pipeline.step_names(), vec!["Step1", "Step2"]);
    }

    #[test]
    fn runs_steps_in_order_and_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        let ctx = fixtures::context(dir.path(), "a.aup3", fixtures::fast_settings())
            .with_progress_callback(Box::new(move |step, percent, _| {
                seen_cb.lock().push((step.to_string(), percent));
            }));

        let launcher = MockLauncher::new();
        let mut session = launcher
            .launch(ctx.project.path(), Arc::clone(&ctx.logger))
            .unwrap();

        let runs = Arc::new(AtomicUsize::new(0));
        let mut skipped = ProbeStep::new("Second", &runs);
        skipped.skip = true;
        let pipeline = Pipeline::new()
            .with_step(ProbeStep::new("First", &runs))
            .with_step(skipped)
            .with_step(ProbeStep::new("Third", &runs));

        let mut state = JobState::new("a");
        let result = pipeline.run(&ctx, session.as_mut(), &mut state).unwrap();

        assert_eq!(result.steps_completed, vec!["First", "Third"]);
        assert_eq!(result.steps_skipped, vec!["Second"]);
        assert!(!result.all_completed());
        assert_eq!(result.total_steps(), 3);
        assert_eq!(
            launcher.commands(),
            vec!["Message: Text=\"First\"", "Message: Text=\"Third\""]
        );

        let progress = seen.lock().clone();
        assert_eq!(progress.first(), Some(&("First".to_string(), 0)));
        assert_eq!(progress.last(), Some(&("Complete".to_string(), 100)));
    }

    #[test]
    fn stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = fixtures::context(dir.path(), "a.aup3", fixtures::fast_settings());

        let launcher = MockLauncher {
            fail_command: Some("Message: Text=\"Second\"".to_string()),
            ..MockLauncher::default()
        };
        let mut session = launcher
            .launch(ctx.project.path(), Arc::clone(&ctx.logger))
            .unwrap();

        let runs = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .with_step(ProbeStep::new("First", &runs))
            .with_step(ProbeStep::new("Second", &runs))
            .with_step(ProbeStep::new("Third", &runs));

        let mut state = JobState::new("a");
        let err = pipeline
            .run(&ctx, session.as_mut(), &mut state)
            .unwrap_err();

        assert!(err.to_string().contains("Second"));
        assert!(err.editor_error().is_some());
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn input_validation_failure_skips_execution() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = fixtures::context(dir.path(), "a.aup3", fixtures::fast_settings());
        let launcher = MockLauncher::new();
        let mut session = launcher
            .launch(ctx.project.path(), Arc::clone(&ctx.logger))
            .unwrap();

        let runs = Arc::new(AtomicUsize::new(0));
        let mut invalid = ProbeStep::new("Invalid", &runs);
        invalid.fail_validation = true;
        let pipeline = Pipeline::new().with_step(invalid);

        let mut state = JobState::new("a");
        assert!(pipeline.run(&ctx, session.as_mut(), &mut state).is_err());
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(launcher.commands().is_empty());
    }
}
