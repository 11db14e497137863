//! Pipeline event type for narration, progress and lifecycle reporting.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Event type constants.
pub mod event_types {
    /// A pipeline run started.
    pub const PIPELINE_STARTED: &str = "pipeline.started";
    /// A pipeline run finished.
    pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
    /// The serialized result of a finished run.
    pub const PIPELINE_RESULT: &str = "pipeline.result";
    /// A stage started.
    pub const STAGE_STARTED: &str = "stage.started";
    /// A stage succeeded.
    pub const STAGE_SUCCEEDED: &str = "stage.succeeded";
    /// A stage failed.
    pub const STAGE_FAILED: &str = "stage.failed";
    /// A stage's progress advanced.
    pub const STAGE_PROGRESS: &str = "stage.progress";
    /// A human-readable line describing what a stage is doing.
    pub const NARRATION: &str = "stage.narration";
}

/// How a narration line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Plain progress narration.
    #[default]
    Info,
    /// A step completed successfully.
    Success,
    /// A step failed.
    Failure,
}

impl Tone {
    /// Marker printed before a console line of this tone.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Failure => "✗ ",
        }
    }
}

/// An event emitted while a pipeline runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageEvent {
    /// The event type (e.g., "stage.started", "stage.narration").
    #[serde(rename = "type")]
    pub event_type: String,

    /// When the event occurred (ISO 8601).
    pub timestamp: String,

    /// The event payload data.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl StageEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: crate::utils::iso_timestamp(),
            data: HashMap::new(),
        }
    }

    /// Adds a data field to the event.
    #[must_use]
    pub fn add_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Returns a string field from the payload.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(serde_json::Value::as_str)
    }

    /// Converts the payload to a JSON object, including the timestamp.
    #[must_use]
    pub fn payload(&self) -> serde_json::Value {
        let mut map: serde_json::Map<String, serde_json::Value> =
            self.data.clone().into_iter().collect();
        map.insert("timestamp".to_string(), serde_json::json!(self.timestamp));
        serde_json::Value::Object(map)
    }

    /// Creates a "pipeline.started" event.
    #[must_use]
    pub fn pipeline_started(pipeline: &str, run_id: &str, stages: &[String]) -> Self {
        Self::new(event_types::PIPELINE_STARTED)
            .add_data("pipeline", serde_json::json!(pipeline))
            .add_data("run_id", serde_json::json!(run_id))
            .add_data("stages", serde_json::json!(stages))
    }

    /// Creates a "pipeline.completed" event.
    #[must_use]
    pub fn pipeline_completed(pipeline: &str, success: bool, exit_code: i32) -> Self {
        Self::new(event_types::PIPELINE_COMPLETED)
            .add_data("pipeline", serde_json::json!(pipeline))
            .add_data("success", serde_json::json!(success))
            .add_data("exit_code", serde_json::json!(exit_code))
    }

    /// Creates a "stage.started" event.
    #[must_use]
    pub fn started(stage_name: &str) -> Self {
        Self::new(event_types::STAGE_STARTED).add_data("stage", serde_json::json!(stage_name))
    }

    /// Creates a "stage.succeeded" event.
    #[must_use]
    pub fn succeeded(stage_name: &str, duration_ms: f64) -> Self {
        Self::new(event_types::STAGE_SUCCEEDED)
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("duration_ms", serde_json::json!(duration_ms))
    }

    /// Creates a "stage.failed" event.
    #[must_use]
    pub fn failed(stage_name: &str, progress: u8, duration_ms: f64) -> Self {
        Self::new(event_types::STAGE_FAILED)
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("progress", serde_json::json!(progress))
            .add_data("duration_ms", serde_json::json!(duration_ms))
    }

    /// Creates a "stage.progress" event.
    #[must_use]
    pub fn progress(stage_name: &str, percent: u8) -> Self {
        Self::new(event_types::STAGE_PROGRESS)
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("percent", serde_json::json!(percent))
    }

    /// Creates a "stage.narration" event.
    #[must_use]
    pub fn narration(stage_name: &str, message: &str, tone: Tone) -> Self {
        Self::new(event_types::NARRATION)
            .add_data("stage", serde_json::json!(stage_name))
            .add_data("message", serde_json::json!(message))
            .add_data("tone", serde_json::json!(tone))
    }
}
