//! Event sink system for narration and observability.
//!
//! Stages and the orchestrator describe what they are doing by emitting
//! events into an [`EventSink`]. The sink decides whether those events become
//! log records, console output, or an in-memory list for tests.

mod sink;

pub use sink::{CollectingEventSink, ConsoleEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use crate::core::StageEvent;

/// Emits a [`StageEvent`] into a sink without blocking.
pub fn emit_event(sink: &dyn EventSink, event: &StageEvent) {
    sink.try_emit(&event.event_type, Some(event.payload()));
}
