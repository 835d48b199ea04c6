//! Evidence records: the only input that moves mastery state.

use serde::{Deserialize, Serialize};

use super::now_micros;

/// One scored interaction, speaking to one or more concepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// Concepts this interaction provides evidence for.
    pub concept_ids: Vec<String>,
    /// Whether the learner answered correctly.
    pub is_correct: bool,
    /// Diagnostic label for the mistake, if any.
    #[serde(default)]
    pub error_type: Option<String>,
    /// Learner correctly explained why.
    #[serde(default)]
    pub explain_why_success: bool,
    /// Learner applied the concept to a new case.
    #[serde(default)]
    pub application_success: bool,
    /// Learner combined the concept with others.
    #[serde(default)]
    pub integration_success: bool,
    /// Response latency in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
    /// When the interaction happened (Unix epoch microseconds).
    pub timestamp: u64,
}

impl EvidenceRecord {
    /// Create a record for the given concepts, stamped now, with no success flags.
    pub fn new<I, S>(concept_ids: I, is_correct: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            concept_ids: concept_ids.into_iter().map(Into::into).collect(),
            is_correct,
            error_type: None,
            explain_why_success: false,
            application_success: false,
            integration_success: false,
            latency_ms: 0,
            timestamp: now_micros(),
        }
    }

    /// Set the error type label.
    pub fn error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Mark a successful explain-why.
    pub fn explained(mut self) -> Self {
        self.explain_why_success = true;
        self
    }

    /// Mark a successful application.
    pub fn applied(mut self) -> Self {
        self.application_success = true;
        self
    }

    /// Mark a successful integration.
    pub fn integrated(mut self) -> Self {
        self.integration_success = true;
        self
    }

    /// Set the latency.
    pub fn latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set the timestamp.
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}
