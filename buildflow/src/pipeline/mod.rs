//! Pipeline building and execution.
//!
//! This module provides:
//! - A builder that validates an ordered stage list
//! - The sequential orchestrator that stops at the first failed stage
//! - The run result and its mapping to a process exit code

mod builder;
mod orchestrator;
mod result;

pub use builder::PipelineBuilder;
pub use orchestrator::{Pipeline, DEFAULT_PIPELINE_NAME};
pub use result::{PipelineExit, PipelineResult};
