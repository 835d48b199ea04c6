//! Time-based mastery decay.

use serde::{Deserialize, Serialize};

use crate::types::{days_between, ConceptMastery, MasteryState};

/// Maximum risk added by one decay pass (reached once a full window has elapsed).
pub const DECAY_STEP: f64 = 0.1;

/// Risk at or above which a functional-or-better concept slips one state.
pub const REGRESSION_RISK: f64 = 0.8;

/// Report from running a decay pass over a mastery graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecayReport {
    /// Number of concepts whose decay risk was updated.
    pub concepts_decayed: usize,
    /// Concepts that slipped a state: (concept id, from, to).
    pub regressed: Vec<(String, MasteryState, MasteryState)>,
}

/// Fraction of the decay window that has elapsed since the last attempt.
///
/// Formula: min(1.0, days_since_last_attempt / window_days)
///
/// Returns 0.0 for never-attempted concepts.
pub fn decay_factor(mastery: &ConceptMastery, window_days: f64, current_time: u64) -> f64 {
    match mastery.last_attempt_at {
        Some(last) => (days_between(last, current_time) / window_days).min(1.0),
        None => 0.0,
    }
}

/// Run one decay pass on a concept. Returns the new state if it regressed.
///
/// Untouched when the concept has never been attempted or is still Unknown.
pub fn decay_concept(
    mastery: &mut ConceptMastery,
    window_days: f64,
    current_time: u64,
) -> Option<MasteryState> {
    if mastery.last_attempt_at.is_none() || mastery.state == MasteryState::Unknown {
        return None;
    }

    let factor = decay_factor(mastery, window_days, current_time);
    mastery.decay_risk = (mastery.decay_risk + factor * DECAY_STEP).min(1.0);

    if mastery.decay_risk >= REGRESSION_RISK && mastery.state >= MasteryState::Functional {
        mastery.state = mastery.state.demoted();
        return Some(mastery.state);
    }
    None
}
