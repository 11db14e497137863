//! Pipeline builder with validation.

use super::{Pipeline, DEFAULT_PIPELINE_NAME};
use crate::context::RunIdentity;
use crate::core::StageStatus;
use crate::errors::PipelineValidationError;
use crate::events::{EventSink, NoOpEventSink};
use crate::stages::Stage;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Builder for creating validated pipelines.
pub struct PipelineBuilder {
    /// The pipeline name.
    name: String,
    /// The stages, in execution order.
    stages: Vec<Box<dyn Stage>>,
    identity: Option<RunIdentity>,
    sink: Option<Arc<dyn EventSink>>,
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("stages", &names)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PIPELINE_NAME)
    }
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            identity: None,
            sink: None,
        }
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage(self, stage: impl Stage + 'static) -> Self {
        self.boxed_stage(Box::new(stage))
    }

    /// Appends an already boxed stage.
    #[must_use]
    pub fn boxed_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Sets the run identity reported in events and the result.
    #[must_use]
    pub fn identity(mut self, identity: RunIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets the sink receiving pipeline-level events.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no stages, two stages share a name, or a
    /// stage has already been executed.
    pub fn build(self) -> Result<Pipeline, PipelineValidationError> {
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new("Pipeline has no stages"));
        }

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.name()) {
                return Err(PipelineValidationError::new(format!(
                    "Duplicate stage name '{}'",
                    stage.name()
                ))
                .with_stages(vec![stage.name().to_string()]));
            }
            if stage.status() != StageStatus::Pending {
                return Err(PipelineValidationError::new(format!(
                    "Stage '{}' has already been executed",
                    stage.name()
                ))
                .with_stages(vec![stage.name().to_string()]));
            }
        }

        Ok(Pipeline::from_parts(
            self.name,
            self.stages,
            self.identity.unwrap_or_default(),
            self.sink.unwrap_or_else(|| Arc::new(NoOpEventSink)),
        ))
    }
}
