//! Test stage: run each configured test identifier.

use super::{Stage, StageRun};
use crate::context::PipelineContext;
use crate::core::{StageKind, StageStatus, Tone};
use crate::progress::percent_of;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs the configured test identifiers in order, stopping at the first
/// failure. Progress advances after every test.
#[derive(Debug)]
pub struct TestStage {
    ctx: Arc<PipelineContext>,
    run: StageRun,
}

impl TestStage {
    /// Creates a test stage named `test`.
    #[must_use]
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        Self::named("test", ctx)
    }

    /// Creates a test stage with a custom name.
    #[must_use]
    pub fn named(name: impl Into<String>, ctx: Arc<PipelineContext>) -> Self {
        let run = StageRun::new(name, StageKind::Test, Arc::clone(ctx.event_sink()));
        Self { ctx, run }
    }
}

#[async_trait]
impl Stage for TestStage {
    fn name(&self) -> &str {
        self.run.name()
    }

    fn kind(&self) -> StageKind {
        StageKind::Test
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

        let config = Arc::clone(self.ctx.config());
        let tests = config.tests.as_deref().unwrap_or_default();
        if tests.is_empty() {
            self.run.narrate("No tests found.", Tone::Info);
            return self.run.succeed("All tests passed.");
        }

        let runner = Arc::clone(self.ctx.test_runner());
        for (index, test_id) in tests.iter().enumerate() {
            self.run.narrate(format!("Running test: {test_id}"), Tone::Info);

            let result = runner.run_test(test_id).await;
            let tone = if result.passed { Tone::Info } else { Tone::Failure };
            self.run.narrate_lines(&result.narration, tone);

            let checkpoint = percent_of(index + 1, tests.len());
            if !self.run.complete_step(checkpoint, result.passed) {
                return self.run.fail(format!("Test failed: {test_id}"));
            }
            self.run.narrate(format!("Test passed: {test_id}"), Tone::Success);
        }

        self.run.succeed("All tests passed.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::events::CollectingEventSink;
    use crate::testing::CountingTestRunner;
    use pretty_assertions::assert_eq;

    fn stage_with(
        tests: Option<Vec<&str>>,
        marker: &str,
    ) -> (TestStage, Arc<CountingTestRunner>, Arc<CollectingEventSink>) {
        let mut config = PipelineConfig::default();
        if let Some(tests) = tests {
            config = config.with_tests(tests);
        }
        let runner = Arc::new(CountingTestRunner::new(marker));
        let sink = Arc::new(CollectingEventSink::new());
        let ctx = PipelineContext::new(config)
            .with_test_runner(runner.clone())
            .with_event_sink(sink.clone());
        (TestStage::new(Arc::new(ctx)), runner, sink)
    }

    #[tokio::test]
    async fn test_failing_last_test_after_two_invocations() {
        let (mut stage, runner, sink) = stage_with(Some(vec!["T1", "T2_Test"]), "Test");

        assert!(!stage.execute().await);
        assert_eq!(runner.calls(), 2);
        assert_eq!(stage.progress(), 50);
        assert_eq!(sink.progress_of("test"), vec![50]);
        assert!(sink.narration().contains(&"Test failed: T2_Test".to_string()));
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let (mut stage, runner, _sink) =
            stage_with(Some(vec!["T1", "T2_Error", "T3", "T4"]), "Error");

        assert!(!stage.execute().await);
        assert_eq!(runner.calls(), 2);
        assert_eq!(runner.seen(), vec!["T1".to_string(), "T2_Error".to_string()]);
        assert_eq!(stage.progress(), 25);
    }

    #[tokio::test]
    async fn test_first_test_failing_reports_no_progress() {
        let (mut stage, runner, sink) =
            stage_with(Some(vec!["T1_Error", "T2", "T3", "T4"]), "Error");

        assert!(!stage.execute().await);
        assert_eq!(runner.calls(), 1);
        assert_eq!(stage.progress(), 0);
        assert!(sink.progress_of("test").is_empty());
    }

    #[tokio::test]
    async fn test_all_pass_reports_per_item_progress() {
        let (mut stage, runner, sink) = stage_with(Some(vec!["T1", "T2", "T3"]), "Error");

        assert!(stage.execute().await);
        assert_eq!(runner.calls(), 3);
        assert_eq!(sink.progress_of("test"), vec![33, 66, 100]);
        assert_eq!(stage.status(), StageStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_empty_list_is_vacuous_success() {
        for tests in [None, Some(Vec::new())] {
            let (mut stage, runner, sink) = stage_with(tests, "Error");

            assert!(stage.execute().await);
            assert_eq!(stage.progress(), 100);
            assert_eq!(runner.calls(), 0);
            assert!(sink.narration().contains(&"No tests found.".to_string()));
        }
    }
}
