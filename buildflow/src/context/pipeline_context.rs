//! The context every stage is constructed with.

use super::RunIdentity;
use crate::config::PipelineConfig;
use crate::dispatch::{HandlerRegistry, ProcessHandler, DEFAULT_FAILURE_MARKER};
use crate::events::{EventSink, NoOpEventSink};
use crate::process::{CommandRunner, CommandSpec, TokioCommandRunner};
use crate::stages::{CommandTestRunner, Confirmation, SimulatedTestRunner, StdinConfirmation, TestRunner};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-only state shared by the stages of one run.
#[derive(Clone)]
pub struct PipelineContext {
    identity: RunIdentity,
    config: Arc<PipelineConfig>,
    handlers: HandlerRegistry,
    test_runner: Arc<dyn TestRunner>,
    smoke_test_runner: Arc<dyn TestRunner>,
    commands: Arc<dyn CommandRunner>,
    confirmation: Arc<dyn Confirmation>,
    event_sink: Arc<dyn EventSink>,
}

impl fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineContext")
            .field("identity", &self.identity)
            .field("config", &self.config)
            .field("handlers", &self.handlers)
            .field("test_runner", &self.test_runner)
            .field("smoke_test_runner", &self.smoke_test_runner)
            .finish_non_exhaustive()
    }
}

impl PipelineContext {
    /// Creates a context with simulated handlers and test runner, real
    /// commands, a stdin confirmation and no event output.
    #[must_use]
    pub fn new(config: impl Into<Arc<PipelineConfig>>) -> Self {
        let config = config.into();
        let marker = config
            .failure_marker
            .clone()
            .unwrap_or_else(|| DEFAULT_FAILURE_MARKER.to_string());

        Self {
            identity: RunIdentity::new(),
            handlers: HandlerRegistry::simulated(marker.clone()),
            test_runner: Arc::new(SimulatedTestRunner::new(marker.clone())),
            smoke_test_runner: Arc::new(SimulatedTestRunner::new(marker)),
            commands: Arc::new(TokioCommandRunner::new()),
            confirmation: Arc::new(StdinConfirmation),
            event_sink: Arc::new(NoOpEventSink),
            config,
        }
    }

    /// Replaces simulated actions with the tools named in the configuration.
    ///
    /// Each `handler.<ext>` entry installs a [`ProcessHandler`] for that
    /// language and `tests.command` installs a [`CommandTestRunner`]. Both run
    /// through `runner`. Build smoke tests stay simulated, since `tests.command`
    /// takes test identifiers rather than source file names.
    #[must_use]
    pub fn with_configured_tools(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        for (id, line) in &self.config.handler_commands {
            match CommandSpec::parse(line) {
                Some(command) => {
                    debug!(handler = %id, command = %command, "Using external handler");
                    self.handlers
                        .register(*id, Arc::new(ProcessHandler::new(command, Arc::clone(&runner))));
                }
                None => warn!(handler = %id, "Ignoring blank handler command"),
            }
        }

        if let Some(command) = self.config.test_command.as_deref().and_then(CommandSpec::parse) {
            debug!(command = %command, "Using external test runner");
            self.test_runner = Arc::new(CommandTestRunner::new(command, runner));
        }
        self
    }

    /// Sets the run identity.
    #[must_use]
    pub fn with_identity(mut self, identity: RunIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Sets the handler registry.
    #[must_use]
    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Sets the test runner.
    #[must_use]
    pub fn with_test_runner(mut self, runner: Arc<dyn TestRunner>) -> Self {
        self.test_runner = runner;
        self
    }

    /// Sets the runner Build uses to smoke-test its work items.
    #[must_use]
    pub fn with_smoke_test_runner(mut self, runner: Arc<dyn TestRunner>) -> Self {
        self.smoke_test_runner = runner;
        self
    }

    /// Sets the command runner used by Deploy and Validate.
    #[must_use]
    pub fn with_commands(mut self, commands: Arc<dyn CommandRunner>) -> Self {
        self.commands = commands;
        self
    }

    /// Sets the confirmation prompt.
    #[must_use]
    pub fn with_confirmation(mut self, confirmation: Arc<dyn Confirmation>) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Returns the run identity.
    #[must_use]
    pub fn identity(&self) -> RunIdentity {
        self.identity
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Arc<PipelineConfig> {
        &self.config
    }

    /// Returns the handler registry.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Returns the test runner.
    #[must_use]
    pub fn test_runner(&self) -> &Arc<dyn TestRunner> {
        &self.test_runner
    }

    /// Returns the runner for Build smoke tests.
    #[must_use]
    pub fn smoke_test_runner(&self) -> &Arc<dyn TestRunner> {
        &self.smoke_test_runner
    }

    /// Returns the command runner.
    #[must_use]
    pub fn commands(&self) -> &Arc<dyn CommandRunner> {
        &self.commands
    }

    /// Returns the confirmation prompt.
    #[must_use]
    pub fn confirmation(&self) -> &Arc<dyn Confirmation> {
        &self.confirmation
    }

    /// Returns the event sink.
    #[must_use]
    pub fn event_sink(&self) -> &Arc<dyn EventSink> {
        &self.event_sink
    }
}
