//! Shared context for a pipeline run.
//!
//! The context bundles the frozen configuration with every capability a
//! stage may need (handlers, test runner, command runner, confirmation and
//! event sink). It is built once and shared read-only between stages.

mod identity;
mod pipeline_context;

pub use identity::RunIdentity;
pub use pipeline_context::PipelineContext;
