//! Mastery transition rules and the per-evidence auxiliary updates.

use serde::{Deserialize, Serialize};

use crate::engine::review::schedule_review;
use crate::types::{ConceptMastery, EvidenceCounts, EvidenceRecord, MasteryState};

/// Decay risk removed by every fresh piece of evidence.
pub const EVIDENCE_DECAY_RELIEF: f64 = 0.2;

/// Number of error types kept for remediation.
pub const TOP_ERROR_TYPES: usize = 3;

/// A state change produced by one evidence application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub concept_id: String,
    pub from: MasteryState,
    pub to: MasteryState,
}

/// Next mastery state after one evidence application.
///
/// The regression guard is checked first; progression then moves at most one
/// step and only looks at the rule belonging to the current state.
pub fn next_state(
    current: MasteryState,
    counts: &EvidenceCounts,
    latest_correct: bool,
) -> MasteryState {
    use MasteryState::*;

    match current {
        s if !latest_correct && counts.incorrect >= 2 && s > Fragile => Fragile,
        Unknown if counts.attempts() > 0 => Fragile,
        Fragile if counts.correct >= 2 => Functional,
        Functional if counts.application >= 1 && counts.explain_why >= 1 => Robust,
        Robust if counts.integration >= 1 => TransferReady,
        s => s,
    }
}

/// `min(1, accuracy * ln(attempts + 1) / 2)`, 0 with no attempts.
pub fn evidence_strength(counts: &EvidenceCounts) -> f64 {
    let attempts = counts.attempts();
    if attempts == 0 {
        return 0.0;
    }
    let accuracy = counts.correct as f64 / attempts as f64;
    (accuracy * (attempts as f64 + 1.0).ln() / 2.0).min(1.0)
}

/// Median of the samples, averaging the middle pair for even counts.
pub fn median(samples: &[u64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    } else {
        Some(sorted[mid] as f64)
    }
}

/// Most frequent labels by count; ties keep first-seen order.
pub fn top_error_types(error_counts: &[(String, u32)], limit: usize) -> Vec<String> {
    let mut ranked: Vec<&(String, u32)> = error_counts.iter().collect();
    // Stable sort on count alone preserves first-seen order among ties.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(limit)
        .map(|(label, _)| label.clone())
        .collect()
}

/// Apply one evidence record to one concept. Returns the state before the update.
pub fn apply_to_concept(mastery: &mut ConceptMastery, record: &EvidenceRecord) -> MasteryState {
    let previous = mastery.state;
    let counts = &mut mastery.counts;

    if record.is_correct {
        counts.correct += 1;
    } else {
        counts.incorrect += 1;
    }
    if record.explain_why_success {
        counts.explain_why += 1;
    }
    if record.application_success {
        counts.application += 1;
    }
    if record.integration_success {
        counts.integration += 1;
    }

    if let Some(label) = record.error_type.as_deref().map(str::trim) {
        if !label.is_empty() {
            match mastery.error_counts.iter().position(|(l, _)| l == label) {
                Some(idx) => mastery.error_counts[idx].1 += 1,
                None => mastery.error_counts.push((label.to_string(), 1)),
            }
        }
    }
    mastery.top_error_types = top_error_types(&mastery.error_counts, TOP_ERROR_TYPES);

    mastery.latency_history.push(record.latency_ms);
    mastery.median_latency_ms = median(&mastery.latency_history);

    mastery.last_attempt_at = Some(
        mastery
            .last_attempt_at
            .map_or(record.timestamp, |t| t.max(record.timestamp)),
    );
    mastery.evidence_strength = evidence_strength(&mastery.counts);
    mastery.decay_risk = (mastery.decay_risk - EVIDENCE_DECAY_RELIEF).max(0.0);
    schedule_review(mastery, record.is_correct, record.timestamp);
    mastery.state = next_state(previous, &mastery.counts, record.is_correct);

    previous
}
