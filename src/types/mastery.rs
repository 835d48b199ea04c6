//! Mastery states and the per-concept mastery record.

use serde::{Deserialize, Serialize};

/// Ordinal mastery of one concept by one learner.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MasteryState {
    /// Never attempted.
    #[default]
    Unknown = 0,
    /// Attempted, not yet reliable.
    Fragile = 1,
    /// Reliably answered.
    Functional = 2,
    /// Can apply and explain.
    Robust = 3,
    /// Can integrate with other concepts.
    TransferReady = 4,
}

impl MasteryState {
    /// All states in ascending order.
    pub const ALL: [MasteryState; 5] = [
        Self::Unknown,
        Self::Fragile,
        Self::Functional,
        Self::Robust,
        Self::TransferReady,
    ];

    /// Convert a u8 value to a MasteryState, returning None for invalid values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::Fragile),
            2 => Some(Self::Functional),
            3 => Some(Self::Robust),
            4 => Some(Self::TransferReady),
            _ => None,
        }
    }

    /// Return a human-readable name for this state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Fragile => "fragile",
            Self::Functional => "functional",
            Self::Robust => "robust",
            Self::TransferReady => "transfer_ready",
        }
    }

    /// Parse a state from a string name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "unknown" => Some(Self::Unknown),
            "fragile" => Some(Self::Fragile),
            "functional" => Some(Self::Functional),
            "robust" => Some(Self::Robust),
            "transfer_ready" | "transferready" => Some(Self::TransferReady),
            _ => None,
        }
    }

    /// The next state up, saturating at `TransferReady`.
    pub fn promoted(self) -> Self {
        Self::from_u8(self as u8 + 1).unwrap_or(Self::TransferReady)
    }

    /// One step down, never below `Fragile` once attempted.
    pub fn demoted(self) -> Self {
        match self {
            Self::Unknown => Self::Unknown,
            Self::Fragile | Self::Functional => Self::Fragile,
            Self::Robust => Self::Functional,
            Self::TransferReady => Self::Robust,
        }
    }
}

impl std::fmt::Display for MasteryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Cumulative evidence counters. Only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvidenceCounts {
    pub correct: u32,
    pub incorrect: u32,
    pub explain_why: u32,
    pub application: u32,
    pub integration: u32,
}

impl EvidenceCounts {
    /// Correct plus incorrect.
    pub fn attempts(&self) -> u32 {
        self.correct + self.incorrect
    }
}

/// Mastery of one concept by one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptMastery {
    /// Concept identifier.
    pub concept_id: String,
    /// Current ordinal state.
    pub state: MasteryState,
    /// Confidence in the state (0.0 - 1.0).
    pub evidence_strength: f64,
    /// Perceived staleness (0.0 - 1.0).
    pub decay_risk: f64,
    /// Last evidence timestamp (Unix epoch microseconds).
    pub last_attempt_at: Option<u64>,
    /// Cumulative counters.
    pub counts: EvidenceCounts,
    /// Up to three most frequent error types.
    pub top_error_types: Vec<String>,
    /// Median response latency; absent until a latency is recorded.
    pub median_latency_ms: Option<f64>,
    /// Error type tallies in first-seen order.
    #[serde(default)]
    pub error_counts: Vec<(String, u32)>,
    /// Every latency recorded, in arrival order.
    #[serde(default)]
    pub latency_history: Vec<u64>,
    /// Current spacing between reviews, in days (0 until first attempt).
    #[serde(default)]
    pub review_interval_days: f64,
    /// When the concept should next be reviewed (Unix epoch microseconds).
    #[serde(default)]
    pub next_review_at: Option<u64>,
}

impl ConceptMastery {
    /// A fresh, never-attempted record.
    pub fn unknown(concept_id: impl Into<String>) -> Self {
        Self {
            concept_id: concept_id.into(),
            state: MasteryState::Unknown,
            evidence_strength: 0.0,
            decay_risk: 0.0,
            last_attempt_at: None,
            counts: EvidenceCounts::default(),
            top_error_types: Vec::new(),
            median_latency_ms: None,
            error_counts: Vec::new(),
            latency_history: Vec::new(),
            review_interval_days: 0.0,
            next_review_at: None,
        }
    }

    /// Whether a review is scheduled at or before `now`.
    pub fn is_due(&self, now: u64) -> bool {
        self.next_review_at.is_some_and(|at| at <= now)
    }

    /// Fraction of attempts answered correctly (0 with no attempts).
    pub fn accuracy(&self) -> f64 {
        let attempts = self.counts.attempts();
        if attempts == 0 {
            0.0
        } else {
            self.counts.correct as f64 / attempts as f64
        }
    }
}
