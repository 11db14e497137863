//! Validate stage: run the program and ask a human whether it worked.

use super::{is_affirmative, Stage, StageRun};
use crate::context::PipelineContext;
use crate::core::{StageKind, StageStatus, Tone};
use crate::process::CommandSpec;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// The question asked once the program has run.
pub const CONFIRMATION_PROMPT: &str = "Did the program work as intended? (yes/no): ";

/// Runs `validate.command`, then waits for an explicit `yes`.
#[derive(Debug)]
pub struct ValidateStage {
    ctx: Arc<PipelineContext>,
    run: StageRun,
}

impl ValidateStage {
    /// Creates a validate stage named `validate`.
    #[must_use]
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        Self::named("validate", ctx)
    }

    /// Creates a validate stage with a custom name.
    #[must_use]
    pub fn named(name: impl Into<String>, ctx: Arc<PipelineContext>) -> Self {
        let run = StageRun::new(name, StageKind::Validate, Arc::clone(ctx.event_sink()));
        Self { ctx, run }
    }

    async fn confirm(&self) -> bool {
        match self.ctx.confirmation().ask(CONFIRMATION_PROMPT).await {
            Ok(answer) => is_affirmative(&answer),
            Err(err) => {
                warn!(stage = %self.run.name(), error = %err, "Could not read confirmation");
                self.run
                    .narrate(format!("Could not read confirmation: {err}"), Tone::Failure);
                false
            }
        }
    }
}

#[async_trait]
impl Stage for ValidateStage {
    fn name(&self) -> &str {
        self.run.name()
    }

    fn kind(&self) -> StageKind {
        StageKind::Validate
    }

    fn status(&self) -> StageStatus {
        self.run.status()
    }

    fn progress(&self) -> u8 {
        self.run.progress()
    }

    async fn execute(&mut self) -> bool {
        if self.run.begin().is_err() {
            return false;
        }

        let Some(program) = self
            .ctx
            .config()
            .validate_command
            .as_deref()
            .and_then(CommandSpec::parse)
        else {
            return self.run.fail("No program configured for validation.");
        };

        self.run.narrate("Starting program validation...", Tone::Info);
        let ran = self
            .run
            .run_command(self.ctx.commands().as_ref(), &program)
            .await;
        if ran {
            self.run.narrate("Program finished successfully.", Tone::Info);
        } else {
            self.run.narrate("Program exited with errors.", Tone::Failure);
        }
        if !self.run.complete_step(50, ran) {
            return self
                .run
                .fail("Program did not run successfully. Validation failed.");
        }

        let confirmed = self.confirm().await;
        if !self.run.complete_step(100, confirmed) {
            return self
                .run
                .fail("Validation failed. Program did not work as expected.");
        }

        self.run.succeed("Program validated successfully!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::events::CollectingEventSink;
    use crate::testing::{ScriptedCommandRunner, ScriptedConfirmation};
    use pretty_assertions::assert_eq;

    fn validate_with(
        config: PipelineConfig,
        commands: Arc<ScriptedCommandRunner>,
        confirmation: Arc<ScriptedConfirmation>,
    ) -> (ValidateStage, Arc<CollectingEventSink>) {
        let sink = Arc::new(CollectingEventSink::new());
        let ctx = PipelineContext::new(config)
            .with_commands(commands)
            .with_confirmation(confirmation)
            .with_event_sink(sink.clone());
        (ValidateStage::new(Arc::new(ctx)), sink)
    }

    fn configured() -> PipelineConfig {
        PipelineConfig::default().with_validate_command("java -cp target/classes Main")
    }

    #[tokio::test]
    async fn test_confirmed_validation() {
        let commands = Arc::new(ScriptedCommandRunner::new());
        let confirmation = Arc::new(ScriptedConfirmation::answering(" Yes \n"));
        let (mut stage, sink) = validate_with(configured(), commands.clone(), confirmation.clone());

        assert!(stage.execute().await);
        assert_eq!(stage.progress(), 100);
        assert_eq!(commands.issued(), vec!["java -cp target/classes Main".to_string()]);
        assert_eq!(confirmation.prompts(), vec![CONFIRMATION_PROMPT.to_string()]);
        assert!(sink
            .narration()
            .contains(&"Program validated successfully!".to_string()));
    }

    #[tokio::test]
    async fn test_rejected_validation() {
        for answer in ["no", "y", "", "yes please"] {
            let commands = Arc::new(ScriptedCommandRunner::new());
            let confirmation = Arc::new(ScriptedConfirmation::answering(answer));
            let (mut stage, _sink) = validate_with(configured(), commands, confirmation);

            assert!(!stage.execute().await, "answer {answer:?} should reject");
            assert_eq!(stage.progress(), 50);
        }
    }

    #[tokio::test]
    async fn test_program_failure_skips_prompt() {
        let commands = Arc::new(ScriptedCommandRunner::new().fail_on("java", 1, "Exception in thread main"));
        let confirmation = Arc::new(ScriptedConfirmation::answering("yes"));
        let (mut stage, sink) = validate_with(configured(), commands, confirmation.clone());

        assert!(!stage.execute().await);
        assert!(confirmation.prompts().is_empty());
        assert!(sink
            .narration()
            .contains(&"Program exited with errors.".to_string()));
    }

    #[tokio::test]
    async fn test_missing_command_is_precondition_failure() {
        let commands = Arc::new(ScriptedCommandRunner::new());
        let confirmation = Arc::new(ScriptedConfirmation::answering("yes"));
        let (mut stage, _sink) =
            validate_with(PipelineConfig::default(), commands.clone(), confirmation.clone());

        assert!(!stage.execute().await);
        assert_eq!(stage.progress(), 0);
        assert!(commands.issued().is_empty());
        assert!(confirmation.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_confirmation_rejects() {
        let commands = Arc::new(ScriptedCommandRunner::new());
        let confirmation = Arc::new(ScriptedConfirmation::closed());
        let (mut stage, _sink) = validate_with(configured(), commands, confirmation);

        assert!(!stage.execute().await);
        assert_eq!(stage.status(), StageStatus::Failed);
    }
}
