//! Per-learner mastery graph: concept id -> mastery record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::decay::{decay_concept, DecayReport};
use crate::engine::transition::{apply_to_concept, StateChange};
use crate::types::{CatError, CatResult, ConceptMastery, EvidenceRecord, MasteryState};

/// Mastery of every concept a learner has touched.
///
/// Concepts never referenced read as `Unknown`; entries are created on first
/// evidence (or seeded with [`MasteryGraph::ensure_concepts`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasteryGraph {
    learner_id: String,
    concepts: BTreeMap<String, ConceptMastery>,
}

impl MasteryGraph {
    /// Create an empty graph for one learner.
    pub fn new(learner_id: impl Into<String>) -> Self {
        Self {
            learner_id: learner_id.into(),
            concepts: BTreeMap::new(),
        }
    }

    /// Rebuild from stored records.
    pub fn from_parts(learner_id: impl Into<String>, records: Vec<ConceptMastery>) -> Self {
        let concepts = records
            .into_iter()
            .map(|m| (m.concept_id.clone(), m))
            .collect();
        Self {
            learner_id: learner_id.into(),
            concepts,
        }
    }

    pub fn learner_id(&self) -> &str {
        &self.learner_id
    }

    /// Number of tracked concepts.
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// All records, ordered by concept id.
    pub fn concepts(&self) -> impl Iterator<Item = &ConceptMastery> {
        self.concepts.values()
    }

    /// Seed `Unknown` entries for the given concepts. Existing entries are kept.
    pub fn ensure_concepts<I, S>(&mut self, concept_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in concept_ids {
            let id = id.into();
            self.concepts
                .entry(id.clone())
                .or_insert_with(|| ConceptMastery::unknown(id));
        }
    }

    /// Apply one evidence record to every concept it names.
    ///
    /// Returns the state changes, in the record's concept order.
    pub fn apply_evidence(&mut self, record: &EvidenceRecord) -> Vec<StateChange> {
        if record.concept_ids.is_empty() {
            log::debug!("evidence without concept ids ignored");
            return Vec::new();
        }

        let mut changes = Vec::new();
        for concept_id in &record.concept_ids {
            let mastery = self
                .concepts
                .entry(concept_id.clone())
                .or_insert_with(|| ConceptMastery::unknown(concept_id.clone()));
            let from = apply_to_concept(mastery, record);
            if mastery.state != from {
                log::info!(
                    "learner {} concept {}: {} -> {}",
                    self.learner_id,
                    concept_id,
                    from,
                    mastery.state
                );
                changes.push(StateChange {
                    concept_id: concept_id.clone(),
                    from,
                    to: mastery.state,
                });
            }
        }
        changes
    }

    /// Apply a batch of records in order.
    pub fn apply_all<'a, I>(&mut self, records: I) -> Vec<StateChange>
    where
        I: IntoIterator<Item = &'a EvidenceRecord>,
    {
        records
            .into_iter()
            .flat_map(|r| self.apply_evidence(r))
            .collect()
    }

    /// Raise decay risk for stale concepts, demoting those that crossed the threshold.
    pub fn apply_decay(&mut self, window_days: f64, current_time: u64) -> CatResult<DecayReport> {
        if !window_days.is_finite() || window_days <= 0.0 {
            return Err(CatError::InvalidDecayWindow(window_days));
        }

        let mut report = DecayReport::default();
        for mastery in self.concepts.values_mut() {
            if mastery.last_attempt_at.is_none() || mastery.state == MasteryState::Unknown {
                continue;
            }
            let from = mastery.state;
            report.concepts_decayed += 1;
            if let Some(to) = decay_concept(mastery, window_days, current_time) {
                log::info!(
                    "learner {} concept {} regressed by decay: {} -> {}",
                    self.learner_id,
                    mastery.concept_id,
                    from,
                    to
                );
                report.regressed.push((mastery.concept_id.clone(), from, to));
            }
        }
        Ok(report)
    }

    /// State of a concept; `Unknown` if never seen.
    pub fn mastery_of(&self, concept_id: &str) -> MasteryState {
        self.concepts
            .get(concept_id)
            .map(|m| m.state)
            .unwrap_or_default()
    }

    pub fn get(&self, concept_id: &str) -> Option<&ConceptMastery> {
        self.concepts.get(concept_id)
    }

    /// Weakest `n` concepts: lowest state, then highest decay risk, then id.
    pub fn weakest(&self, n: usize) -> Vec<&ConceptMastery> {
        let mut all: Vec<&ConceptMastery> = self.concepts.values().collect();
        all.sort_by(|a, b| {
            a.state
                .cmp(&b.state)
                .then_with(|| b.decay_risk.total_cmp(&a.decay_risk))
                .then_with(|| a.concept_id.cmp(&b.concept_id))
        });
        all.truncate(n);
        all
    }

    /// Concepts currently in `state`, ordered by id.
    pub fn by_state(&self, state: MasteryState) -> Vec<&ConceptMastery> {
        self.concepts.values().filter(|m| m.state == state).collect()
    }

    /// Attempted concepts with decay risk at or above `threshold`, riskiest first.
    pub fn at_risk(&self, threshold: f64) -> Vec<&ConceptMastery> {
        let mut hits: Vec<&ConceptMastery> = self
            .concepts
            .values()
            .filter(|m| m.state >= MasteryState::Fragile && m.decay_risk >= threshold)
            .collect();
        hits.sort_by(|a, b| b.decay_risk.total_cmp(&a.decay_risk));
        hits
    }

    /// Count of concepts per state, every state present.
    pub fn state_histogram(&self) -> BTreeMap<MasteryState, usize> {
        let mut histogram: BTreeMap<MasteryState, usize> =
            MasteryState::ALL.iter().map(|s| (*s, 0)).collect();
        for mastery in self.concepts.values() {
            *histogram.entry(mastery.state).or_insert(0) += 1;
        }
        histogram
    }

    /// Concepts whose review is due at `now`, longest overdue first.
    pub fn due_for_review(&self, now: u64) -> Vec<&ConceptMastery> {
        let mut due: Vec<&ConceptMastery> =
            self.concepts.values().filter(|m| m.is_due(now)).collect();
        due.sort_by_key(|m| m.next_review_at);
        due
    }

    /// Earliest review scheduled strictly after `now`.
    pub fn next_review_after(&self, now: u64) -> Option<u64> {
        self.concepts
            .values()
            .filter_map(|m| m.next_review_at)
            .filter(|at| *at > now)
            .min()
    }

    /// Up to `n` attempted concepts, most recent first.
    pub fn recently_attempted(&self, n: usize) -> Vec<&ConceptMastery> {
        let mut attempted: Vec<&ConceptMastery> = self
            .concepts
            .values()
            .filter(|m| m.last_attempt_at.is_some())
            .collect();
        attempted.sort_by(|a, b| b.last_attempt_at.cmp(&a.last_attempt_at));
        attempted.truncate(n);
        attempted
    }
}
