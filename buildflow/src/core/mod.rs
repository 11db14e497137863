//! Core domain model types for buildflow.
//!
//! This module contains the fundamental types shared by stages and the
//! orchestrator:
//! - Stage status and kind enums
//! - Stage outcomes
//! - Pipeline events

mod event;
mod outcome;
mod status;

pub use event::{event_types, StageEvent, Tone};
pub use outcome::StageOutcome;
pub use status::{StageKind, StageStatus};
