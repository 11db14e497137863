//! Injected capabilities for stages.
//!
//! Stages reach the outside world only through these ports, so a test can
//! hand them a scripted implementation and a real run can hand them one
//! backed by processes and the terminal.

use crate::dispatch::{HandlerResult, DEFAULT_FAILURE_MARKER};
use crate::process::{CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Runs one test identifier.
#[async_trait]
pub trait TestRunner: Send + Sync + Debug {
    /// Runs a test and reports its verdict.
    async fn run_test(&self, test_id: &str) -> HandlerResult;
}

/// A test runner that fails iff the identifier contains its marker.
#[derive(Debug, Clone)]
pub struct SimulatedTestRunner {
    marker: String,
}

impl Default for SimulatedTestRunner {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_MARKER)
    }
}

impl SimulatedTestRunner {
    /// Creates a simulated runner with a failure marker.
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

#[async_trait]
impl TestRunner for SimulatedTestRunner {
    async fn run_test(&self, test_id: &str) -> HandlerResult {
        let narration = format!("Executing test: {test_id}");
        if test_id.contains(&self.marker) {
            HandlerResult::fail(narration)
        } else {
            HandlerResult::pass(narration)
        }
    }
}

/// A test runner that launches an external tool with the test id appended.
pub struct CommandTestRunner {
    command: CommandSpec,
    runner: Arc<dyn CommandRunner>,
}

impl Debug for CommandTestRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTestRunner")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl CommandTestRunner {
    /// Creates a runner that executes `command <test_id>`.
    #[must_use]
    pub fn new(command: CommandSpec, runner: Arc<dyn CommandRunner>) -> Self {
        Self { command, runner }
    }
}

#[async_trait]
impl TestRunner for CommandTestRunner {
    async fn run_test(&self, test_id: &str) -> HandlerResult {
        let command = self.command.clone().arg(test_id);
        match self.runner.run(&command).await {
            Ok(output) => HandlerResult::pass(output.lines().join("\n")),
            Err(err) => HandlerResult::fail(err.to_string()),
        }
    }
}

/// Asks a human to confirm something.
#[async_trait]
pub trait Confirmation: Send + Sync + Debug {
    /// Shows `prompt` and returns the raw answer line.
    async fn ask(&self, prompt: &str) -> std::io::Result<String>;
}

/// Returns true only for the literal answer `yes`, ignoring case and
/// surrounding whitespace.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_lowercase() == "yes"
}

/// Prompts on stdout and reads one line from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirmation;

#[async_trait]
impl Confirmation for StdinConfirmation {
    async fn ask(&self, prompt: &str) -> std::io::Result<String> {
        {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
        }

        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CommandError;
    use crate::process::{CommandOutput, MockCommandRunner};

    #[tokio::test]
    async fn test_simulated_runner_marker() {
        let runner = SimulatedTestRunner::new("Test");

        assert!(runner.run_test("T1").await.passed);
        assert!(!runner.run_test("T2_Test").await.passed);
    }

    #[tokio::test]
    async fn test_simulated_runner_default_marker() {
        let runner = SimulatedTestRunner::default();

        assert!(runner.run_test("LoginTest").await.passed);
        assert!(!runner.run_test("ErrorPathTest").await.passed);
    }

    #[tokio::test]
    async fn test_command_runner_appends_id() {
        let mut commands = MockCommandRunner::new();
        commands
            .expect_run()
            .withf(|cmd| cmd.display() == "junit --select-class T1")
            .returning(|_| Ok(CommandOutput::new("1 test passed\n")));
        commands
            .expect_run()
            .withf(|cmd| cmd.display() == "junit --select-class T2")
            .returning(|cmd| Err(CommandError::non_zero(cmd.display(), 1, "1 test failed")));

        let runner = CommandTestRunner::new(
            CommandSpec::new("junit", ["--select-class"]),
            Arc::new(commands),
        );

        let passed = runner.run_test("T1").await;
        assert!(passed.passed);
        assert_eq!(passed.narration, "1 test passed");

        let failed = runner.run_test("T2").await;
        assert!(!failed.passed);
        assert!(failed.narration.contains("exited with status 1"));
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("  YES\n"));
        assert!(is_affirmative("Yes"));
        assert!(!is_affirmative("y"));
        assert!(!is_affirmative("yes please"));
        assert!(!is_affirmative(""));
    }
}
