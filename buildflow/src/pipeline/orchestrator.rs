//! Sequential stage orchestration.

use super::{PipelineExit, PipelineResult};
use crate::context::{PipelineContext, RunIdentity};
use crate::core::{StageEvent, Tone};
use crate::events::{emit_event, EventSink};
use crate::stages::{BuildStage, DeployStage, Stage, TestStage, ValidateStage};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Name used when a pipeline is not given one.
pub const DEFAULT_PIPELINE_NAME: &str = "buildflow";

/// An ordered list of single-use stages run one after another.
pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn Stage>>,
    identity: RunIdentity,
    sink: Arc<dyn EventSink>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub(super) fn from_parts(
        name: String,
        stages: Vec<Box<dyn Stage>>,
        identity: RunIdentity,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            name,
            stages,
            identity,
            sink,
        }
    }

    /// Build → Test → (Validate) → Deploy over a shared context.
    #[must_use]
    pub fn standard(ctx: &Arc<PipelineContext>, include_validate: bool) -> Self {
        let mut stages: Vec<Box<dyn Stage>> = vec![
            Box::new(BuildStage::new(Arc::clone(ctx))),
            Box::new(TestStage::new(Arc::clone(ctx))),
        ];
        if include_validate {
            stages.push(Box::new(ValidateStage::new(Arc::clone(ctx))));
        }
        stages.push(Box::new(DeployStage::new(Arc::clone(ctx))));

        Self::from_parts(
            DEFAULT_PIPELINE_NAME.to_string(),
            stages,
            ctx.identity(),
            Arc::clone(ctx.event_sink()),
        )
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs the stages in order, stopping at the first one that fails.
    pub async fn run(mut self) -> PipelineResult {
        let run_id = self.identity.to_string();
        let names: Vec<String> = self.stages.iter().map(|s| s.name().to_string()).collect();

        info!(pipeline = %self.name, run_id = %run_id, stages = ?names, "Pipeline started");
        emit_event(
            self.sink.as_ref(),
            &StageEvent::pipeline_started(&self.name, &run_id, &names),
        );
        self.narrate("Starting the build pipeline...", Tone::Info);

        let mut outcomes = Vec::with_capacity(self.stages.len());
        let mut exit = PipelineExit::Success;

        for index in 0..self.stages.len() {
            let stage = &mut self.stages[index];
            let passed = stage.execute().await;
            outcomes.push(stage.outcome());

            let label = stage.name().to_string();
            if !passed {
                exit = PipelineExit::for_failure(stage.kind(), &label);
                warn!(pipeline = %self.name, stage = %label, exit_code = exit.exit_code(), "Pipeline stopped");
                self.narrate(&format!("{label} failed, stopping."), Tone::Failure);
                break;
            }

            match self.stages.get(index + 1) {
                Some(next) => {
                    let message = format!("{label} succeeded, proceeding to {}.", next.name());
                    self.narrate(&message, Tone::Success);
                }
                None => self.narrate(&format!("{label} succeeded."), Tone::Success),
            }
        }

        if exit.is_success() {
            self.narrate("Pipeline succeeded.", Tone::Success);
        }

        info!(pipeline = %self.name, exit = %exit, "Pipeline completed");
        emit_event(
            self.sink.as_ref(),
            &StageEvent::pipeline_completed(&self.name, exit.is_success(), exit.exit_code()),
        );

        PipelineResult {
            run_id: self.identity,
            outcomes,
            exit,
        }
    }

    fn narrate(&self, message: &str, tone: Tone) {
        emit_event(
            self.sink.as_ref(),
            &StageEvent::narration(&self.name, message, tone),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{event_types, StageKind};
    use crate::pipeline::PipelineBuilder;
    use crate::testing::{
        assert_narration_contains, assert_stage_failed_at, assert_stage_succeeded,
        complete_config, MockStage, TestFixture,
    };
    use crate::events::CollectingEventSink;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_build_failure_runs_nothing_else() {
        let test = MockStage::passing("test", StageKind::Test);
        let deploy = MockStage::passing("deploy", StageKind::Deploy);
        let (test_calls, deploy_calls) = (test.counter(), deploy.counter());

        let result = PipelineBuilder::default()
            .stage(MockStage::failing("build", StageKind::Build, 33))
            .stage(test)
            .stage(deploy)
            .build()
            .unwrap()
            .run()
            .await;

        assert_eq!(test_calls.get(), 0);
        assert_eq!(deploy_calls.get(), 0);
        assert_eq!(result.executed(), vec!["build"]);
        assert_eq!(result.exit, PipelineExit::SoftStop { stage: "build".to_string() });
        assert_eq!(result.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_later_failure_is_error() {
        let deploy = MockStage::passing("deploy", StageKind::Deploy);
        let deploy_calls = deploy.counter();

        let result = PipelineBuilder::default()
            .stage(MockStage::passing("build", StageKind::Build))
            .stage(MockStage::failing("test", StageKind::Test, 50))
            .stage(deploy)
            .build()
            .unwrap()
            .run()
            .await;

        assert_eq!(deploy_calls.get(), 0);
        assert_eq!(result.executed(), vec!["build", "test"]);
        assert_eq!(result.exit_code(), 1);
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_transition_narration() {
        let sink = Arc::new(CollectingEventSink::new());
        let result = PipelineBuilder::new("demo")
            .event_sink(sink.clone())
            .stage(MockStage::passing("build", StageKind::Build))
            .stage(MockStage::passing("test", StageKind::Test))
            .build()
            .unwrap()
            .run()
            .await;

        assert!(result.success());
        assert_eq!(
            sink.narration(),
            vec![
                "Starting the build pipeline...".to_string(),
                "build succeeded, proceeding to test.".to_string(),
                "test succeeded.".to_string(),
                "Pipeline succeeded.".to_string(),
            ]
        );

        let completed = sink.events_of_type(event_types::PIPELINE_COMPLETED);
        assert_eq!(completed[0].1.as_ref().unwrap()["exit_code"], 0);
    }

    #[tokio::test]
    async fn test_standard_pipeline_end_to_end() {
        let fixture = TestFixture::new();
        let ctx = fixture.context(complete_config());
        let result = Pipeline::standard(&ctx, true).run().await;

        assert!(result.success());
        assert_eq!(result.executed(), vec!["build", "test", "validate", "deploy"]);
        for outcome in &result.outcomes {
            assert_stage_succeeded(outcome);
        }
        assert_eq!(result.run_id, ctx.identity());
        assert_eq!(fixture.commands.issued().len(), 6);
        assert_narration_contains(&fixture.sink, "Deployment to GitHub successful.");
    }

    #[tokio::test]
    async fn test_standard_pipeline_without_validate() {
        let fixture = TestFixture::new();
        let pipeline = Pipeline::standard(&fixture.context(complete_config()), false);

        assert_eq!(pipeline.stage_names(), vec!["build", "test", "deploy"]);
        assert!(pipeline.run().await.success());
        assert!(fixture.confirmation.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_standard_pipeline_build_failure() {
        let fixture = TestFixture::new();
        let config = complete_config().with_scripts(["A.java", "B_Error.py"]);
        let result = Pipeline::standard(&fixture.context(config), true).run().await;

        assert_eq!(result.exit_code(), 2);
        assert_stage_failed_at(&result.outcomes[0], 33);
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(fixture.tests.calls(), 0);
        assert!(fixture.commands.issued().is_empty());
        assert_narration_contains(&fixture.sink, "build failed, stopping.");
    }

    #[tokio::test]
    async fn test_standard_pipeline_test_failure() {
        let fixture = TestFixture::new().with_marker("Test");
        let config = complete_config()
            .with_scripts(["A.java"])
            .with_tests(["T1", "T2_Test"]);
        let result = Pipeline::standard(&fixture.context(config), false).run().await;

        assert_eq!(result.exit, PipelineExit::Error { stage: "test".to_string() });
        assert_stage_failed_at(result.outcome("test").unwrap(), 50);
        // One Build smoke test plus two Test invocations.
        assert_eq!(fixture.tests.calls(), 3);
        assert!(fixture.commands.issued().is_empty());
    }

    #[tokio::test]
    async fn test_standard_pipeline_rejected_validation() {
        let fixture = TestFixture::new().with_answer("no");
        let result = Pipeline::standard(&fixture.context(complete_config()), true)
            .run()
            .await;

        assert_eq!(result.exit_code(), 1);
        assert_eq!(result.exit.failed_stage(), Some("validate"));
        // Only the validated program ran; nothing was deployed.
        assert_eq!(
            fixture.commands.issued(),
            vec!["java -cp target/classes Main".to_string()]
        );
    }

    #[test]
    fn test_run_blocks_on_runtime() {
        let pipeline = PipelineBuilder::default()
            .stage(MockStage::passing("build", StageKind::Build))
            .build()
            .unwrap();

        let result = tokio_test::block_on(pipeline.run());
        assert_eq!(result.outcomes.len(), 1);
    }
}
