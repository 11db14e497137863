//! Error types for the buildflow pipeline.
//!
//! Errors never cross a stage boundary: every stage converts the errors it
//! observes into narration plus a failed outcome. These types exist so the
//! pieces below a stage can still use `Result` and `?`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The main error type for buildflow operations.
#[derive(Debug, Error)]
pub enum BuildflowError {
    /// A configuration problem occurred.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// A work item could not be classified.
    #[error("{0}")]
    Classification(#[from] ClassificationError),

    /// An external command failed.
    #[error("{0}")]
    Command(#[from] CommandError),

    /// A pipeline could not be assembled.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// A stage was executed more than once.
    #[error("Stage '{stage}' has already been executed")]
    AlreadyExecuted {
        /// The stage name.
        stage: String,
    },
}

impl BuildflowError {
    /// Creates an already-executed error.
    #[must_use]
    pub fn already_executed(stage: impl Into<String>) -> Self {
        Self::AlreadyExecuted {
            stage: stage.into(),
        }
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required key was absent.
    #[error("Missing configuration key: {key}")]
    MissingKey {
        /// The key that was looked up.
        key: String,
    },

    /// A line of the properties file could not be parsed.
    #[error("Malformed configuration at line {line}: {content}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// The configuration file could not be read.
    #[error("Failed to read configuration from {path}: {source}")]
    Read {
        /// The file path.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Creates a missing key error.
    #[must_use]
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }
}

/// Why a work item could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationErrorKind {
    /// The extension is missing or not in the handler table.
    UnsupportedFileType,
}

impl fmt::Display for ClassificationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFileType => write!(f, "Unsupported file type"),
        }
    }
}

/// Error raised when a work item's extension has no handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {name}")]
pub struct ClassificationError {
    /// The failure kind.
    pub kind: ClassificationErrorKind,
    /// The work item name.
    pub name: String,
}

impl ClassificationError {
    /// Creates an unsupported file type error.
    #[must_use]
    pub fn unsupported(name: impl Into<String>) -> Self {
        Self {
            kind: ClassificationErrorKind::UnsupportedFileType,
            name: name.into(),
        }
    }
}

/// Errors produced by external command execution.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The process could not be started or waited on.
    #[error("Failed to launch '{command}': {reason}")]
    Launch {
        /// The rendered command line.
        command: String,
        /// The IO failure description.
        reason: String,
    },

    /// The process exited with a non-zero status.
    #[error("Command '{command}' exited with status {code}")]
    NonZeroExit {
        /// The rendered command line.
        command: String,
        /// The exit code, or -1 when terminated by a signal.
        code: i32,
        /// Combined output captured before exit.
        output: String,
    },
}

impl CommandError {
    /// Creates a launch error.
    #[must_use]
    pub fn launch(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Launch {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Creates a non-zero exit error.
    #[must_use]
    pub fn non_zero(command: impl Into<String>, code: i32, output: impl Into<String>) -> Self {
        Self::NonZeroExit {
            command: command.into(),
            code,
            output: output.into(),
        }
    }

    /// Captured output of a command that exited with failure.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::NonZeroExit { output, .. } if !output.trim().is_empty() => Some(output),
            _ => None,
        }
    }

    /// Converts to a dictionary representation for event payloads.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        match self {
            Self::Launch { command, reason } => {
                map.insert("type".to_string(), serde_json::json!("CommandLaunch"));
                map.insert("command".to_string(), serde_json::json!(command));
                map.insert("reason".to_string(), serde_json::json!(reason));
            }
            Self::NonZeroExit { command, code, .. } => {
                map.insert("type".to_string(), serde_json::json!("CommandNonZeroExit"));
                map.insert("command".to_string(), serde_json::json!(command));
                map.insert("code".to_string(), serde_json::json!(code));
            }
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Error raised when a pipeline cannot be assembled.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }
}
