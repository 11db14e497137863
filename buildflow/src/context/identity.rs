//! Run identity for tracking pipeline executions.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this pipeline run.
    pub pipeline_run_id: Uuid,
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl RunIdentity {
    /// Creates a new run identity with a generated pipeline run ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pipeline_run_id: Uuid::new_v4(),
        }
    }

    /// Creates a run identity with a specific pipeline run ID.
    #[must_use]
    pub fn with_pipeline_run_id(pipeline_run_id: Uuid) -> Self {
        Self { pipeline_run_id }
    }
}

impl fmt::Display for RunIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pipeline_run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_identities_differ() {
        assert_ne!(RunIdentity::new(), RunIdentity::new());
    }

    #[test]
    fn test_display_is_uuid() {
        let id = Uuid::new_v4();
        let identity = RunIdentity::with_pipeline_run_id(id);
        assert_eq!(identity.to_string(), id.to_string());
    }

    #[test]
    fn test_serialize() {
        let identity = RunIdentity::new();
        let json = serde_json::to_value(identity).unwrap();
        assert_eq!(json["pipeline_run_id"], identity.pipeline_run_id.to_string());
    }
}
