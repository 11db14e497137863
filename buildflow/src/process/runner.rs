//! Command runner port and implementations.

use super::redact_credentials;
use crate::errors::CommandError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use tracing::{debug, info};

/// A command to run: program plus arguments, no shell involved.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to execute.
    pub program: String,
    /// Arguments passed verbatim.
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Creates a command.
    #[must_use]
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a whitespace-separated command line.
    ///
    /// Returns `None` for a blank line.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Renders the command line with credentials redacted.
    #[must_use]
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(char::is_whitespace) {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        redact_credentials(&line)
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandSpec").field(&self.display()).finish()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Output of a command that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Stdout followed by stderr.
    pub combined: String,
}

impl CommandOutput {
    /// Creates an output from combined text.
    #[must_use]
    pub fn new(combined: impl Into<String>) -> Self {
        Self {
            combined: combined.into(),
        }
    }

    /// Non-empty output lines with credentials redacted.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.combined
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .map(redact_credentials)
            .collect()
    }
}

/// Runs external commands.
///
/// Implementations return `Ok` only for a zero exit status; launch failures
/// and non-zero exits are both errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs a command to completion and captures its combined output.
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

/// Runs commands as child processes with tokio.
#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner {
    working_dir: Option<PathBuf>,
}

impl TokioCommandRunner {
    /// Creates a runner using the current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every command in the given directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let rendered = command.display();
        debug!(command = %rendered, "Spawning command");

        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| CommandError::launch(&rendered, e.to_string()))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(CommandOutput::new(combined))
        } else {
            let code = output.status.code().unwrap_or(-1);
            debug!(command = %rendered, code, "Command exited with failure");
            Err(CommandError::non_zero(rendered, code, redact_credentials(&combined)))
        }
    }
}

/// Logs commands instead of running them and reports success.
#[derive(Debug, Default)]
pub struct DryRunCommandRunner {
    issued: Mutex<Vec<String>>,
}

impl DryRunCommandRunner {
    /// Creates a dry-run runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the redacted command lines seen so far.
    #[must_use]
    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().clone()
    }
}

#[async_trait]
impl CommandRunner for DryRunCommandRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let rendered = command.display();
        info!(command = %rendered, "Dry run: command not executed");
        self.issued.lock().push(rendered);
        Ok(CommandOutput::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_and_redacts() {
        let cmd = CommandSpec::new("git", ["commit", "-m", "Automated deployment from pipeline"]);
        assert_eq!(cmd.display(), r#"git commit -m "Automated deployment from pipeline""#);

        let cmd = CommandSpec::new("git", ["remote", "set-url", "origin", "https://u:t@github.com/a/b"]);
        assert_eq!(cmd.to_string(), "git remote set-url origin https://***@github.com/a/b");
        assert!(!format!("{cmd:?}").contains("u:t"));
    }

    #[test]
    fn test_parse_command_line() {
        let cmd = CommandSpec::parse("java -cp target/classes Main").unwrap();
        assert_eq!(cmd.program, "java");
        assert_eq!(cmd.args, vec!["-cp", "target/classes", "Main"]);
        assert!(CommandSpec::parse("   ").is_none());
        assert_eq!(CommandSpec::new("sh", Vec::<String>::new()).arg("x.sh").args, vec!["x.sh"]);
    }

    #[test]
    fn test_output_lines() {
        let output = CommandOutput::new("line one\n\nhttps://a:b@host/x\n");
        assert_eq!(output.lines(), vec!["line one", "https://***@host/x"]);
    }

    #[tokio::test]
    async fn test_dry_run_records_commands() {
        let runner = DryRunCommandRunner::new();
        let result = runner.run(&CommandSpec::new("git", ["add", "."])).await;

        assert!(result.is_ok());
        assert_eq!(runner.issued(), vec!["git add .".to_string()]);
    }

    #[tokio::test]
    async fn test_tokio_runner_missing_program() {
        let runner = TokioCommandRunner::new();
        let err = runner
            .run(&CommandSpec::new("buildflow-definitely-missing-program", ["--version"]))
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_exit_status() {
        let runner = TokioCommandRunner::new();

        let ok = runner.run(&CommandSpec::new("sh", ["-c", "echo hello"])).await.unwrap();
        assert_eq!(ok.lines(), vec!["hello"]);

        let err = runner
            .run(&CommandSpec::new("sh", ["-c", "echo nope >&2; exit 3"]))
            .await
            .unwrap_err();
        match err {
            CommandError::NonZeroExit { command, code, output } => {
                assert_eq!(command, r#"sh -c "echo nope >&2; exit 3""#);
                assert_eq!(code, 3);
                assert!(output.contains("nope"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
