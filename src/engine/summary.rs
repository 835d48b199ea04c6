//! Compact overview of a domain graph and a learner's progress through it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::{DomainGraph, MasteryGraph};
use crate::types::MasteryState;

/// A recently attempted concept, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentConcept {
    pub concept_id: String,
    /// Node title, or the id when the concept is not in the domain graph.
    pub title: String,
    pub state: MasteryState,
    pub last_attempt_at: u64,
}

/// Counts and histograms over a domain graph plus one learner's mastery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    /// Node type name -> count.
    pub node_types: BTreeMap<String, usize>,
    /// Edge type name -> count.
    pub edge_types: BTreeMap<String, usize>,
    /// Mastery state name -> count; empty without a mastery graph.
    pub mastery_states: BTreeMap<String, usize>,
    /// Most recently attempted concepts, newest first.
    pub recent: Vec<RecentConcept>,
    /// Concepts whose review time has passed.
    pub review_due_count: usize,
    /// Earliest review still in the future.
    pub next_review_at: Option<u64>,
}

impl GraphSummary {
    /// Summarize `domain`, optionally joined with a learner's mastery as of `now`.
    pub fn build(
        domain: &DomainGraph,
        mastery: Option<&MasteryGraph>,
        recent_limit: usize,
        now: u64,
    ) -> Self {
        let node_types = domain
            .type_index()
            .histogram()
            .into_iter()
            .map(|(kind, count)| (kind.to_string(), count))
            .collect();
        let edge_types = domain
            .edge_type_histogram()
            .into_iter()
            .map(|(edge_type, count)| (edge_type.name().to_string(), count))
            .collect();

        let mut summary = Self {
            node_count: domain.node_count(),
            edge_count: domain.edge_count(),
            node_types,
            edge_types,
            ..Self::default()
        };

        if let Some(mastery) = mastery {
            summary.mastery_states = mastery
                .state_histogram()
                .into_iter()
                .map(|(state, count)| (state.name().to_string(), count))
                .collect();
            summary.review_due_count = mastery.due_for_review(now).len();
            summary.next_review_at = mastery.next_review_after(now);
            summary.recent = mastery
                .recently_attempted(recent_limit)
                .into_iter()
                .filter_map(|m| {
                    let last_attempt_at = m.last_attempt_at?;
                    let title = domain
                        .get(&m.concept_id)
                        .map(|n| n.title.clone())
                        .unwrap_or_else(|| m.concept_id.clone());
                    Some(RecentConcept {
                        concept_id: m.concept_id.clone(),
                        title,
                        state: m.state,
                        last_attempt_at,
                    })
                })
                .collect();
        }

        summary
    }
}
