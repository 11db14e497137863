//! Scripted ports and mock stages for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::{StageKind, StageStatus};
use crate::dispatch::{Handler, HandlerId, HandlerRegistry, HandlerResult, SimulatedHandler, WorkItem};
use crate::errors::CommandError;
use crate::process::{CommandOutput, CommandRunner, CommandSpec};
use crate::stages::{Confirmation, SimulatedTestRunner, Stage, TestRunner};

/// A shared counter that survives moving a stage into a pipeline.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    /// Adds one call.
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns the number of calls so far.
    #[must_use]
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A stage with a fixed verdict that counts its executions.
#[derive(Debug)]
pub struct MockStage {
    name: String,
    kind: StageKind,
    passes: bool,
    failure_progress: u8,
    status: StageStatus,
    progress: u8,
    calls: CallCounter,
}

impl MockStage {
    /// Creates a stage that succeeds.
    #[must_use]
    pub fn passing(name: impl Into<String>, kind: StageKind) -> Self {
        Self {
            name: name.into(),
            kind,
            passes: true,
            failure_progress: 0,
            status: StageStatus::Pending,
            progress: 0,
            calls: CallCounter::default(),
        }
    }

    /// Creates a stage that fails after reaching `progress`.
    #[must_use]
    pub fn failing(name: impl Into<String>, kind: StageKind, progress: u8) -> Self {
        Self {
            passes: false,
            failure_progress: progress,
            ..Self::passing(name, kind)
        }
    }

    /// Returns a handle on the execution counter.
    #[must_use]
    pub fn counter(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl Stage for MockStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StageKind {
        self.kind
    }

    fn status(&self) -> StageStatus {
        self.status
    }

    fn progress(&self) -> u8 {
        self.progress
    }

    async fn execute(&mut self) -> bool {
        self.calls.increment();
        if self.status != StageStatus::Pending {
            return false;
        }

        if self.passes {
            self.status = StageStatus::Succeeded;
            self.progress = 100;
        } else {
            self.status = StageStatus::Failed;
            self.progress = self.failure_progress;
        }
        self.passes
    }
}

/// A command runner that records commands and fails the ones it was told to.
#[derive(Debug, Default)]
pub struct ScriptedCommandRunner {
    failures: Vec<(String, i32, String)>,
    output: String,
    issued: Mutex<Vec<CommandSpec>>,
}

impl ScriptedCommandRunner {
    /// Creates a runner where every command succeeds silently.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails commands whose redacted line starts with `prefix`.
    #[must_use]
    pub fn fail_on(mut self, prefix: impl Into<String>, code: i32, output: impl Into<String>) -> Self {
        self.failures.push((prefix.into(), code, output.into()));
        self
    }

    /// Sets the output returned by successful commands.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Returns the redacted command lines seen so far.
    #[must_use]
    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().iter().map(CommandSpec::display).collect()
    }

    /// Returns the commands exactly as received.
    #[must_use]
    pub fn raw(&self) -> Vec<CommandSpec> {
        self.issued.lock().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedCommandRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        self.issued.lock().push(command.clone());

        let display = command.display();
        match self
            .failures
            .iter()
            .find(|(prefix, _, _)| display.starts_with(prefix.as_str()))
        {
            Some((_, code, output)) => Err(CommandError::non_zero(display, *code, output.clone())),
            None => Ok(CommandOutput::new(self.output.clone())),
        }
    }
}

/// A confirmation with a canned answer.
#[derive(Debug, Default)]
pub struct ScriptedConfirmation {
    answer: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmation {
    /// Answers every prompt with `answer`.
    #[must_use]
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Behaves like a closed stdin.
    #[must_use]
    pub fn closed() -> Self {
        Self::default()
    }

    /// Returns the prompts shown so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Confirmation for ScriptedConfirmation {
    async fn ask(&self, prompt: &str) -> io::Result<String> {
        self.prompts.lock().push(prompt.to_string());
        self.answer
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"))
    }
}

/// A simulated test runner that records every test id it runs.
#[derive(Debug)]
pub struct CountingTestRunner {
    inner: SimulatedTestRunner,
    seen: Mutex<Vec<String>>,
}

impl CountingTestRunner {
    /// Creates a runner failing ids that contain `marker`.
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            inner: SimulatedTestRunner::new(marker),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Number of tests run.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    /// Test ids in the order they ran.
    #[must_use]
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl TestRunner for CountingTestRunner {
    async fn run_test(&self, test_id: &str) -> HandlerResult {
        self.seen.lock().push(test_id.to_string());
        self.inner.run_test(test_id).await
    }
}

/// A simulated handler that records every work item it handles.
#[derive(Debug)]
pub struct CountingHandler {
    inner: SimulatedHandler,
    seen: Mutex<Vec<String>>,
}

impl CountingHandler {
    /// Creates a handler failing names that contain `marker`.
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            inner: SimulatedHandler::new(marker),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Builds a registry routing every handler id to this handler.
    #[must_use]
    pub fn registry(self: &Arc<Self>) -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        for id in HandlerId::all() {
            let handler: Arc<dyn Handler> = Arc::clone(self) as Arc<dyn Handler>;
            registry.register(id, handler);
        }
        registry
    }

    /// Number of items handled.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    /// Item names in the order they were handled.
    #[must_use]
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl Handler for CountingHandler {
    async fn handle(&self, id: HandlerId, item: &WorkItem) -> HandlerResult {
        self.seen.lock().push(item.name().to_string());
        self.inner.handle(id, item).await
    }
}
