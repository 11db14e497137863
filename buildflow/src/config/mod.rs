//! Configuration loading.
//!
//! Configuration is read once at startup from a properties file into a
//! [`ConfigStore`] and projected into an immutable [`PipelineConfig`] that
//! every stage receives at construction time.

mod pipeline_config;
mod store;

pub use pipeline_config::{keys, DeployCredentials, PipelineConfig};
pub use store::ConfigStore;
