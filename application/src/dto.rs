use serde::{Deserialize, Serialize};
use validator::Validate;

use prescreen_domain::{TriageFault, TriageResult};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TriageBatchRequest {
    #[validate(length(min = 1))]
    pub submissions: Vec<String>,
}

impl TriageBatchRequest {
    pub fn new(submissions: Vec<String>) -> Self {
        Self { submissions }
    }
}

/// One triage decision, keyed by submission name.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub name: String,
    #[serde(flatten)]
    pub result: TriageResult,
}

/// Per-batch mapping from submission name to triage result, in the order
/// the submissions were supplied.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<SubmissionOutcome>,
}

impl BatchReport {
    pub fn get(&self, name: &str) -> Option<&TriageResult> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.name == name)
            .map(|outcome| &outcome.result)
    }

    pub fn accepted(&self) -> impl Iterator<Item = &SubmissionOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_accepted())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Result of persisting a triaged batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveSummary {
    /// Names of submissions persisted and removed from the surface.
    pub archived: Vec<String>,
    /// Persistence faults that did not abort the write.
    pub persistence_faults: Vec<TriageFault>,
}
