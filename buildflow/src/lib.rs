//! # Buildflow
//!
//! A linear build pipeline: Build → Test → (Validate) → Deploy.
//!
//! Buildflow provides the orchestration skeleton of a small CI runner:
//!
//! - **Short-circuiting stages**: each stage runs ordered sub-steps and stops
//!   at the first failure; the pipeline stops at the first failed stage
//! - **Table-driven dispatch**: work items are classified by extension and
//!   routed to a handler, simulated or backed by a real tool
//! - **Narration and progress**: stages report what they do through an event
//!   sink that logs, prints or collects
//! - **Distinct exit codes**: a Build failure is a soft stop, anything later is
//!   an error
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use buildflow::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), BuildflowError> {
//! let store = ConfigStore::load_or_empty("config.properties")?;
//! let ctx = Arc::new(PipelineContext::new(PipelineConfig::from_store(&store)));
//!
//! let result = Pipeline::standard(&ctx, false).run().await;
//! std::process::exit(result.exit_code());
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cli;
pub mod config;
pub mod context;
pub mod core;
pub mod dispatch;
pub mod errors;
pub mod events;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod stages;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigStore, DeployCredentials, PipelineConfig};
    pub use crate::context::{PipelineContext, RunIdentity};
    pub use crate::core::{StageEvent, StageKind, StageOutcome, StageStatus, Tone};
    pub use crate::dispatch::{
        classify, Handler, HandlerId, HandlerRegistry, HandlerResult, WorkItem,
    };
    pub use crate::errors::{
        BuildflowError, ClassificationError, CommandError, ConfigError,
        PipelineValidationError,
    };
    pub use crate::events::{
        CollectingEventSink, ConsoleEventSink, EventSink, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineExit, PipelineResult};
    pub use crate::process::{CommandRunner, CommandSpec, TokioCommandRunner};
    pub use crate::stages::{
        BuildStage, Confirmation, DeployStage, Stage, TestRunner, TestStage, ValidateStage,
    };
    pub use crate::utils::{iso_timestamp, Timestamp};
}
