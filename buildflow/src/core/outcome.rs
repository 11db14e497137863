//! Stage outcome reported to the orchestrator.

use super::{StageKind, StageStatus};
use serde::{Deserialize, Serialize};

/// The result of one stage execution.
///
/// Created when `execute()` returns and consumed immediately by the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutcome {
    /// The stage name.
    pub stage: String,
    /// The stage kind.
    pub kind: StageKind,
    /// Whether every sub-step passed.
    pub passed: bool,
    /// Progress reached when the stage stopped.
    pub progress: u8,
}

impl StageOutcome {
    /// Creates a new outcome.
    #[must_use]
    pub fn new(stage: impl Into<String>, kind: StageKind, passed: bool, progress: u8) -> Self {
        Self {
            stage: stage.into(),
            kind,
            passed,
            progress,
        }
    }

    /// Returns the status this outcome represents.
    #[must_use]
    pub fn status(&self) -> StageStatus {
        if self.passed {
            StageStatus::Succeeded
        } else {
            StageStatus::Failed
        }
    }
}
