//! Work items and handler results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named unit of input, usually a source file.
///
/// Identity is the name. The extension is derived once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItem {
    name: String,
    extension: Option<String>,
}

impl WorkItem {
    /// Creates a work item, deriving its extension from the last `.`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .map(ToString::to_string);
        Self { name, extension }
    }

    /// Returns the item name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the suffix after the last `.`, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The verdict of one handler invocation plus what it said while working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResult {
    /// Whether the item was processed successfully.
    pub passed: bool,
    /// Human-readable description of what happened.
    pub narration: String,
}

impl HandlerResult {
    /// Creates a passing result.
    #[must_use]
    pub fn pass(narration: impl Into<String>) -> Self {
        Self {
            passed: true,
            narration: narration.into(),
        }
    }

    /// Creates a failing result.
    #[must_use]
    pub fn fail(narration: impl Into<String>) -> Self {
        Self {
            passed: false,
            narration: narration.into(),
        }
    }
}
