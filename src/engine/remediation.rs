//! Prerequisite remediation: what to shore up before retrying a concept.

use serde::{Deserialize, Serialize};

use crate::graph::{DomainGraph, MasteryGraph, TraversalDirection};
use crate::types::{CatResult, EdgeType, MasteryState};

/// A prerequisite the learner has not yet made functional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationTarget {
    pub concept_id: String,
    pub title: String,
    pub state: MasteryState,
    pub decay_risk: f64,
    /// Hops from the concept being remediated (1 = direct prerequisite).
    pub distance: u32,
}

/// Transitive prerequisites of `concept_id` below `Functional`, weakest first.
///
/// Weakest means lowest state, then highest decay risk, then nearest, then id.
pub fn remediation_targets(
    domain: &DomainGraph,
    mastery: &MasteryGraph,
    concept_id: &str,
) -> CatResult<Vec<RemediationTarget>> {
    let traversal = domain.traverse(
        concept_id,
        &[EdgeType::DependsOn],
        TraversalDirection::Forward,
        u32::MAX,
    )?;

    let mut targets: Vec<RemediationTarget> = traversal
        .visited
        .iter()
        .skip(1)
        .filter_map(|id| {
            let state = mastery.mastery_of(id);
            if state >= MasteryState::Functional {
                return None;
            }
            let node = domain.get(id)?;
            Some(RemediationTarget {
                concept_id: id.clone(),
                title: node.title.clone(),
                state,
                decay_risk: mastery.get(id).map(|m| m.decay_risk).unwrap_or(0.0),
                distance: traversal.depths.get(id).copied().unwrap_or(0),
            })
        })
        .collect();

    targets.sort_by(|a, b| {
        a.state
            .cmp(&b.state)
            .then_with(|| b.decay_risk.total_cmp(&a.decay_risk))
            .then_with(|| a.distance.cmp(&b.distance))
            .then_with(|| a.concept_id.cmp(&b.concept_id))
    });

    log::debug!(
        "remediation for {}: {} prerequisite(s) below functional",
        concept_id,
        targets.len()
    );
    Ok(targets)
}
