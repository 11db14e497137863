//! Stage trait and the pipeline's concrete stages.
//!
//! A stage is a single-use unit of work made of ordered sub-steps. It stops
//! at the first failing sub-step and reports a binary result plus the
//! progress it reached.

mod build;
mod deploy;
mod lifecycle;
mod ports;
mod test;
mod validate;

pub use build::BuildStage;
pub use deploy::{DeployStage, COMMIT_MESSAGE};
pub use lifecycle::StageRun;
pub use ports::{
    is_affirmative, CommandTestRunner, Confirmation, SimulatedTestRunner, StdinConfirmation,
    TestRunner,
};
pub use test::TestStage;
pub use validate::{ValidateStage, CONFIRMATION_PROMPT};

use crate::core::{StageKind, StageOutcome, StageStatus};
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for pipeline stages.
///
/// `execute` runs at most once per instance. Calling it again returns
/// `false` without doing any work and without changing the recorded status.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Returns which pipeline phase the stage implements.
    fn kind(&self) -> StageKind;

    /// Returns the current lifecycle status.
    fn status(&self) -> StageStatus;

    /// Returns the progress reached so far, 0 to 100.
    fn progress(&self) -> u8;

    /// Executes the stage, returning true iff every sub-step passed.
    async fn execute(&mut self) -> bool;

    /// Returns the outcome as it stands now.
    fn outcome(&self) -> StageOutcome {
        StageOutcome::new(
            self.name(),
            self.kind(),
            self.status().is_success(),
            self.progress(),
        )
    }
}
