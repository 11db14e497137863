//! Testing utilities for buildflow pipelines.
//!
//! This module provides:
//! - Scripted stand-ins for every port a stage talks to
//! - Mock stages that count how often they ran
//! - Fixtures wiring the stand-ins into a context
//! - Assertions over stage outcomes and narration

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_narration_contains, assert_stage_failed_at, assert_stage_succeeded,
};
pub use fixtures::{complete_config, TestFixture};
pub use mocks::{
    CallCounter, CountingHandler, CountingTestRunner, MockStage, ScriptedCommandRunner,
    ScriptedConfirmation,
};
