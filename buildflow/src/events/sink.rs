//! Event sink trait and implementations.

use crate::core::{event_types, Tone};
use crate::progress;
use async_trait::async_trait;
use tracing::{debug, info, Level};

/// Trait for event sinks that can receive events.
///
/// Event sinks carry narration and progress out of the stages for
/// logging, console output, or test inspection.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The type of event (e.g., "stage.started")
    /// * `data` - Optional event data
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>);

    /// Tries to emit an event without blocking.
    ///
    /// This method never fails. Sinks that cannot deliver an event drop it.
    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>);
}

/// A no-op event sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}

    fn try_emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}
}

/// An event sink that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    /// The log level to use.
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a new logging event sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    fn log_event(&self, event_type: &str, data: &Option<serde_json::Value>) {
        let stage = data
            .as_ref()
            .and_then(|d| d.get("stage"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-");

        if self.level == Level::DEBUG {
            debug!(event_type = %event_type, stage = %stage, event_data = ?data, "Event: {}", event_type);
        } else {
            info!(event_type = %event_type, stage = %stage, event_data = ?data, "Event: {}", event_type);
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.log_event(event_type, &data);
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.log_event(event_type, &data);
    }
}

/// An event sink that prints narration and progress bars to stdout.
#[derive(Debug, Clone)]
pub struct ConsoleEventSink {
    show_progress: bool,
    bar_width: usize,
}

impl Default for ConsoleEventSink {
    fn default() -> Self {
        Self {
            show_progress: true,
            bar_width: progress::DEFAULT_BAR_WIDTH,
        }
    }
}

impl ConsoleEventSink {
    /// Creates a console sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables progress bars.
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Returns the line this sink prints for an event, if any.
    #[must_use]
    pub fn render_line(&self, event_type: &str, data: Option<&serde_json::Value>) -> Option<String> {
        let data = data?;
        match event_type {
            event_types::NARRATION => {
                let message = data.get("message").and_then(serde_json::Value::as_str)?;
                let tone: Tone = data
                    .get("tone")
                    .and_then(|t| serde_json::from_value(t.clone()).ok())
                    .unwrap_or_default();
                Some(format!("{}{message}", tone.marker()))
            }
            event_types::STAGE_PROGRESS if self.show_progress => {
                let percent = data.get("percent").and_then(serde_json::Value::as_u64)?;
                let percent = u8::try_from(percent.min(100)).unwrap_or(100);
                Some(progress::render(percent, self.bar_width))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl EventSink for ConsoleEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.try_emit(event_type, data);
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        if let Some(line) = self.render_line(event_type, data.as_ref()) {
            println!("{line}");
        }
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<(String, Option<serde_json::Value>)>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Option<serde_json::Value>)> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events matching a type prefix.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<(String, Option<serde_json::Value>)> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t.starts_with(type_prefix))
            .cloned()
            .collect()
    }

    /// Returns the narration messages in emission order.
    #[must_use]
    pub fn narration(&self) -> Vec<String> {
        self.events_of_type(event_types::NARRATION)
            .into_iter()
            .filter_map(|(_, data)| {
                data.and_then(|d| d.get("message").and_then(|m| m.as_str().map(String::from)))
            })
            .collect()
    }

    /// Returns the progress percentages reported for a stage, in order.
    #[must_use]
    pub fn progress_of(&self, stage: &str) -> Vec<u64> {
        self.events_of_type(event_types::STAGE_PROGRESS)
            .into_iter()
            .filter_map(|(_, data)| data)
            .filter(|d| d.get("stage").and_then(serde_json::Value::as_str) == Some(stage))
            .filter_map(|d| d.get("percent").and_then(serde_json::Value::as_u64))
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StageEvent, Tone};
    use crate::events::emit_event;

    #[tokio::test]
    async fn test_noop_sink() {
        let sink = NoOpEventSink;
        sink.emit("test", None).await;
        sink.try_emit("test", Some(serde_json::json!({"x": 1})));
    }

    #[tokio::test]
    async fn test_logging_sink() {
        let sink = LoggingEventSink::default();
        sink.emit("stage.started", Some(serde_json::json!({"stage": "build"}))).await;
        sink.try_emit("stage.started", None);
        LoggingEventSink::debug().try_emit("stage.progress", None);
    }

    #[tokio::test]
    async fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit("event1", None).await;
        sink.try_emit("event2", Some(serde_json::json!({"data": true})));

        assert_eq!(sink.len(), 2);

        let events = sink.events();
        assert_eq!(events[0].0, "event1");
        assert_eq!(events[1].0, "event2");

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_collecting_sink_narration_and_progress() {
        let sink = CollectingEventSink::new();
        emit_event(&sink, &StageEvent::narration("build", "Compiling C file: m.c", Tone::Info));
        emit_event(&sink, &StageEvent::progress("build", 33));
        emit_event(&sink, &StageEvent::progress("test", 50));

        assert_eq!(sink.narration(), vec!["Compiling C file: m.c".to_string()]);
        assert_eq!(sink.progress_of("build"), vec![33]);
        assert_eq!(sink.events_of_type("stage.").len(), 3);
    }

    #[test]
    fn test_console_render_line() {
        let sink = ConsoleEventSink::new();
        let narration = StageEvent::narration("build", "Packaging successful.", Tone::Success);
        let progress = StageEvent::progress("build", 100);

        assert_eq!(
            sink.render_line(&narration.event_type, Some(&narration.payload())),
            Some("✓ Packaging successful.".to_string())
        );
        let bar = sink
            .render_line(&progress.event_type, Some(&progress.payload()))
            .unwrap();
        assert!(bar.ends_with("] 100%"));
        assert_eq!(sink.render_line("stage.started", None), None);
    }

    #[test]
    fn test_console_marks_tone() {
        let sink = ConsoleEventSink::new();
        let failed = StageEvent::narration("test", "Test failed: T2", Tone::Failure);
        let info = StageEvent::narration("test", "Running test: T2", Tone::Info);

        assert_eq!(
            sink.render_line(&failed.event_type, Some(&failed.payload())),
            Some("✗ Test failed: T2".to_string())
        );
        assert_eq!(
            sink.render_line(&info.event_type, Some(&info.payload())),
            Some("Running test: T2".to_string())
        );
    }

    #[test]
    fn test_console_without_progress() {
        let sink = ConsoleEventSink::new().with_progress(false);
        let progress = StageEvent::progress("build", 66);
        assert_eq!(
            sink.render_line(&progress.event_type, Some(&progress.payload())),
            None
        );
    }
}
