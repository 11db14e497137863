//! Test assertions for stage outcomes.

use crate::core::StageOutcome;
use crate::events::CollectingEventSink;

/// Asserts that the outcome passed with progress 100.
pub fn assert_stage_succeeded(outcome: &StageOutcome) {
    assert!(
        outcome.passed && outcome.progress == 100,
        "Expected '{}' to succeed at 100%, got passed={} progress={}",
        outcome.stage,
        outcome.passed,
        outcome.progress
    );
}

/// Asserts that the outcome failed with the given progress.
pub fn assert_stage_failed_at(outcome: &StageOutcome, progress: u8) {
    assert!(!outcome.passed, "Expected '{}' to fail", outcome.stage);
    assert_eq!(
        outcome.progress, progress,
        "Expected '{}' to stop at {}%, got {}%",
        outcome.stage, progress, outcome.progress
    );
}

/// Asserts that some narration line equals `line`.
pub fn assert_narration_contains(sink: &CollectingEventSink, line: &str) {
    let narration = sink.narration();
    assert!(
        narration.iter().any(|l| l == line),
        "Expected narration to contain {line:?}. Narration: {narration:#?}"
    );
}
