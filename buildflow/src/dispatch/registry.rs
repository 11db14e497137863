//! Handler registry for dispatching work items.

use super::{classify, HandlerId, HandlerResult, WorkItem, DEFAULT_FAILURE_MARKER};
use crate::errors::ClassificationError;
use crate::process::{CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::debug;

/// Processes one work item of a given kind.
///
/// Handlers never fail with an error: every outcome, including I/O trouble,
/// is expressed as a [`HandlerResult`].
#[async_trait]
pub trait Handler: Send + Sync + Debug {
    /// Handles a work item that was classified as `id`.
    async fn handle(&self, id: HandlerId, item: &WorkItem) -> HandlerResult;
}

/// A handler that pretends to compile or run a file.
///
/// Fails iff the item name contains the failure marker (case-sensitive).
#[derive(Debug, Clone)]
pub struct SimulatedHandler {
    marker: String,
}

impl Default for SimulatedHandler {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_MARKER)
    }
}

impl SimulatedHandler {
    /// Creates a simulated handler with a failure marker.
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Returns the failure marker.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }
}

#[async_trait]
impl Handler for SimulatedHandler {
    async fn handle(&self, id: HandlerId, item: &WorkItem) -> HandlerResult {
        let narration = id.narration(item.name());
        if item.name().contains(&self.marker) {
            HandlerResult::fail(narration)
        } else {
            HandlerResult::pass(narration)
        }
    }
}

/// A handler that runs a real tool with the file as its last argument.
pub struct ProcessHandler {
    command: CommandSpec,
    runner: Arc<dyn CommandRunner>,
}

impl Debug for ProcessHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandler")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl ProcessHandler {
    /// Creates a handler that runs `command <file>` through `runner`.
    #[must_use]
    pub fn new(command: CommandSpec, runner: Arc<dyn CommandRunner>) -> Self {
        Self { command, runner }
    }
}

#[async_trait]
impl Handler for ProcessHandler {
    async fn handle(&self, id: HandlerId, item: &WorkItem) -> HandlerResult {
        let command = self.command.clone().arg(item.name());
        let heading = id.narration(item.name());

        match self.runner.run(&command).await {
            Ok(output) => {
                let mut narration = heading;
                for line in output.lines() {
                    narration.push('\n');
                    narration.push_str(&line);
                }
                HandlerResult::pass(narration)
            }
            Err(err) => HandlerResult::fail(format!("{heading}\n{err}")),
        }
    }
}

/// Fixed mapping from handler id to handler.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerId, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with a simulated handler for every id.
    #[must_use]
    pub fn simulated(marker: impl Into<String>) -> Self {
        let handler: Arc<dyn Handler> = Arc::new(SimulatedHandler::new(marker));
        let mut registry = Self::new();
        for id in HandlerId::all() {
            registry.register(id, Arc::clone(&handler));
        }
        registry
    }

    /// Registers (or replaces) the handler for an id.
    pub fn register(&mut self, id: HandlerId, handler: Arc<dyn Handler>) {
        self.handlers.insert(id, handler);
    }

    /// Registers a handler, returning the updated registry.
    #[must_use]
    pub fn with_handler(mut self, id: HandlerId, handler: Arc<dyn Handler>) -> Self {
        self.register(id, handler);
        self
    }

    /// Returns true if the id has a handler.
    #[must_use]
    pub fn is_registered(&self, id: HandlerId) -> bool {
        self.handlers.contains_key(&id)
    }

    /// Invokes the handler registered for `id`.
    ///
    /// An unregistered id yields a failing result rather than an error.
    pub async fn invoke(&self, id: HandlerId, item: &WorkItem) -> HandlerResult {
        match self.handlers.get(&id) {
            Some(handler) => {
                let result = handler.handle(id, item).await;
                debug!(handler = %id, item = %item, passed = result.passed, "Handler invoked");
                result
            }
            None => HandlerResult::fail(format!("No {id} handler registered for: {item}")),
        }
    }

    /// Classifies a work item and invokes its handler.
    ///
    /// # Errors
    ///
    /// Returns a classification error for unsupported extensions; the handler
    /// is not invoked in that case.
    pub async fn dispatch(&self, item: &WorkItem) -> Result<HandlerResult, ClassificationError> {
        let id = classify(item.name())?;
        Ok(self.invoke(id, item).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CommandError;
    use crate::process::{CommandOutput, MockCommandRunner};

    #[tokio::test]
    async fn test_simulated_handler_marker() {
        let handler = SimulatedHandler::default();

        let ok = handler.handle(HandlerId::Java, &WorkItem::new("A.java")).await;
        assert!(ok.passed);
        assert_eq!(ok.narration, "Compiling Java file: A.java");

        let bad = handler.handle(HandlerId::Python, &WorkItem::new("B_Error.py")).await;
        assert!(!bad.passed);
        assert_eq!(bad.narration, "Running Python file: B_Error.py");
    }

    #[tokio::test]
    async fn test_simulated_marker_is_case_sensitive() {
        let handler = SimulatedHandler::default();
        let result = handler.handle(HandlerId::Go, &WorkItem::new("error.go")).await;
        assert!(result.passed);
    }

    #[tokio::test]
    async fn test_registry_simulated_covers_all_ids() {
        let registry = HandlerRegistry::simulated(DEFAULT_FAILURE_MARKER);
        assert!(HandlerId::all().all(|id| registry.is_registered(id)));
    }

    #[tokio::test]
    async fn test_registry_unregistered_fails() {
        let registry = HandlerRegistry::new();
        let result = registry.invoke(HandlerId::Rust, &WorkItem::new("main.rs")).await;

        assert!(!result.passed);
        assert!(result.narration.contains("main.rs"));
    }

    #[tokio::test]
    async fn test_dispatch_classifies_first() {
        let registry = HandlerRegistry::simulated("Error");

        let result = registry.dispatch(&WorkItem::new("app.ts")).await.unwrap();
        assert!(result.narration.starts_with("Transpiling TypeScript"));

        assert!(registry.dispatch(&WorkItem::new("README.md")).await.is_err());
    }

    #[tokio::test]
    async fn test_process_handler_success() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.program == "python3" && cmd.args == vec!["B.py"])
            .times(1)
            .returning(|_| Ok(CommandOutput::new("ok\n")));

        let handler = ProcessHandler::new(
            CommandSpec::new("python3", Vec::<String>::new()),
            Arc::new(runner),
        );
        let result = handler.handle(HandlerId::Python, &WorkItem::new("B.py")).await;

        assert!(result.passed);
        assert_eq!(result.narration, "Running Python file: B.py\nok");
    }

    #[tokio::test]
    async fn test_process_handler_failure_degrades() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|cmd| Err(CommandError::launch(cmd.display(), "No such file or directory")));

        let registry = HandlerRegistry::simulated("Error").with_handler(
            HandlerId::C,
            Arc::new(ProcessHandler::new(CommandSpec::new("cc", ["-c"]), Arc::new(runner))),
        );
        let result = registry.invoke(HandlerId::C, &WorkItem::new("main.c")).await;

        assert!(!result.passed);
        assert!(result.narration.contains("Failed to launch 'cc -c main.c'"));
    }
}
