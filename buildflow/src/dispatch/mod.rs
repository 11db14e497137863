//! Work item classification and handler dispatch.
//!
//! A work item's extension selects a [`HandlerId`] from a closed table; the
//! [`HandlerRegistry`] then maps that id to the [`Handler`] that processes
//! the item.

mod classify;
mod registry;
mod work_item;

pub use classify::{classify, extensions, HandlerId, DEFAULT_FAILURE_MARKER};
pub use registry::{Handler, HandlerRegistry, ProcessHandler, SimulatedHandler};
pub use work_item::{HandlerResult, WorkItem};
