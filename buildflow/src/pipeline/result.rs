//! Pipeline run result.

use crate::context::RunIdentity;
use crate::core::{StageKind, StageOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a pipeline run ended.
///
/// A Build failure is a soft stop (nothing was produced, nothing to roll
/// back) and is kept distinct from a failure in a later stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineExit {
    /// Every stage passed.
    Success,
    /// A Build stage failed.
    SoftStop {
        /// The failed stage.
        stage: String,
    },
    /// A Test, Validate or Deploy stage failed.
    Error {
        /// The failed stage.
        stage: String,
    },
}

impl PipelineExit {
    /// Exit code for a clean run.
    pub const SUCCESS_CODE: i32 = 0;
    /// Exit code when a later stage failed.
    pub const ERROR_CODE: i32 = 1;
    /// Exit code when Build failed.
    pub const SOFT_STOP_CODE: i32 = 2;

    /// Classifies the failure of a stage.
    #[must_use]
    pub fn for_failure(kind: StageKind, stage: impl Into<String>) -> Self {
        let stage = stage.into();
        match kind {
            StageKind::Build => Self::SoftStop { stage },
            StageKind::Test | StageKind::Validate | StageKind::Deploy => Self::Error { stage },
        }
    }

    /// The process exit code for this ending.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => Self::SUCCESS_CODE,
            Self::SoftStop { .. } => Self::SOFT_STOP_CODE,
            Self::Error { .. } => Self::ERROR_CODE,
        }
    }

    /// Returns true for [`PipelineExit::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The stage that stopped the run, if any.
    #[must_use]
    pub fn failed_stage(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::SoftStop { stage } | Self::Error { stage } => Some(stage),
        }
    }
}

impl fmt::Display for PipelineExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::SoftStop { stage } => write!(f, "soft stop at {stage}"),
            Self::Error { stage } => write!(f, "error at {stage}"),
        }
    }
}

/// The terminal artifact of a run: outcomes of the stages that actually ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// The run this result belongs to.
    pub run_id: RunIdentity,
    /// One outcome per executed stage, in order.
    pub outcomes: Vec<StageOutcome>,
    /// How the run ended.
    pub exit: PipelineExit,
}

impl PipelineResult {
    /// Returns true if every stage passed.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit.is_success()
    }

    /// The process exit code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.exit.exit_code()
    }

    /// The outcome recorded for a stage name.
    #[must_use]
    pub fn outcome(&self, stage: &str) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }

    /// Names of the stages that ran, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<&str> {
        self.outcomes.iter().map(|o| o.stage.as_str()).collect()
    }
}
