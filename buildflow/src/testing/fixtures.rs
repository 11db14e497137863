//! Test fixtures for pipeline testing.

use std::sync::Arc;

use super::{CountingHandler, CountingTestRunner, ScriptedCommandRunner, ScriptedConfirmation};
use crate::config::PipelineConfig;
use crate::context::PipelineContext;
use crate::dispatch::DEFAULT_FAILURE_MARKER;
use crate::events::CollectingEventSink;

/// A configuration under which every stage of the standard pipeline passes.
#[must_use]
pub fn complete_config() -> PipelineConfig {
    PipelineConfig::default()
        .with_scripts(["A.java", "B.py"])
        .with_tests(["T1", "T2"])
        .with_app_version("1.0")
        .with_credentials("octo", "s3cret", "https://github.com/acme/app.git")
        .with_validate_command("java -cp target/classes Main")
}

/// Scripted ports plus a collecting sink, ready to be wired into a context.
///
/// The fields stay accessible after the context is built so tests can
/// inspect what each port saw.
#[derive(Debug)]
pub struct TestFixture {
    /// Receives every event.
    pub sink: Arc<CollectingEventSink>,
    /// Records Deploy and Validate commands.
    pub commands: Arc<ScriptedCommandRunner>,
    /// Answers the Validate prompt.
    pub confirmation: Arc<ScriptedConfirmation>,
    /// Runs Test and Build smoke tests.
    pub tests: Arc<CountingTestRunner>,
    /// Handles Build work items.
    pub handlers: Arc<CountingHandler>,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Creates a fixture using the default failure marker and answering `yes`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: Arc::new(CollectingEventSink::new()),
            commands: Arc::new(ScriptedCommandRunner::new()),
            confirmation: Arc::new(ScriptedConfirmation::answering("yes")),
            tests: Arc::new(CountingTestRunner::new(DEFAULT_FAILURE_MARKER)),
            handlers: Arc::new(CountingHandler::new(DEFAULT_FAILURE_MARKER)),
        }
    }

    /// Uses `marker` for both the handlers and the test runner.
    #[must_use]
    pub fn with_marker(mut self, marker: &str) -> Self {
        self.tests = Arc::new(CountingTestRunner::new(marker));
        self.handlers = Arc::new(CountingHandler::new(marker));
        self
    }

    /// Replaces the command runner.
    #[must_use]
    pub fn with_commands(mut self, commands: ScriptedCommandRunner) -> Self {
        self.commands = Arc::new(commands);
        self
    }

    /// Replaces the confirmation answer.
    #[must_use]
    pub fn with_answer(mut self, answer: &str) -> Self {
        self.confirmation = Arc::new(ScriptedConfirmation::answering(answer));
        self
    }

    /// Builds a context over `config` wired to this fixture's ports.
    #[must_use]
    pub fn context(&self, config: PipelineConfig) -> Arc<PipelineContext> {
        Arc::new(
            PipelineContext::new(config)
                .with_handlers(self.handlers.registry())
                .with_test_runner(self.tests.clone())
                .with_smoke_test_runner(self.tests.clone())
                .with_commands(self.commands.clone())
                .with_confirmation(self.confirmation.clone())
                .with_event_sink(self.sink.clone()),
        )
    }
}
