//! Adaptive test session: greedy maximum-information selection plus a
//! one-step ability update after every response.

use serde::{Deserialize, Serialize};

use crate::engine::forecast::{predictive_plot, PredictivePlot};
use crate::types::{
    now_micros, AbilityEstimate, CatError, CatResult, EstimationMethod, EvidenceRecord, Item,
    LearnerProfile, THETA_MAX, THETA_MIN,
};

/// Lower bound on information used in the ability step.
pub const INFORMATION_FLOOR: f64 = 1e-3;

/// Theta movement below this counts as a non-informative response.
pub const STALL_THRESHOLD: f64 = 0.01;

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Administered the maximum number of items.
    MaxItems,
    /// Standard error reached the target.
    TargetStandardError,
    /// Ability reached the mastery threshold.
    MasteryTheta,
    /// Too many consecutive responses barely moved theta.
    Stalled,
    /// No items left to administer.
    PoolExhausted,
}

impl TerminationReason {
    /// Order in which conditions are checked after each response.
    const CHECK_ORDER: [TerminationReason; 4] = [
        Self::MaxItems,
        Self::TargetStandardError,
        Self::MasteryTheta,
        Self::Stalled,
    ];

    /// Return a human-readable name for this reason.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MaxItems => "max_items",
            Self::TargetStandardError => "target_standard_error",
            Self::MasteryTheta => "mastery_theta",
            Self::Stalled => "stalled",
            Self::PoolExhausted => "pool_exhausted",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// When a session should stop. Fixed at session start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminationCriteria {
    /// Stop once the standard error is at or below this.
    pub target_standard_error: f64,
    /// Stop after this many responses.
    pub max_items: usize,
    /// Stop once theta reaches this, if set.
    #[serde(default)]
    pub mastery_theta: Option<f64>,
    /// Stop after this many consecutive non-informative responses (0 disables).
    #[serde(default)]
    pub max_stall_count: u32,
}

impl Default for TerminationCriteria {
    fn default() -> Self {
        Self {
            target_standard_error: 0.3,
            max_items: 25,
            mastery_theta: Some(1.2),
            max_stall_count: 3,
        }
    }
}

impl TerminationCriteria {
    /// Criteria that stop only on item count.
    pub fn max_items(max_items: usize) -> Self {
        Self {
            target_standard_error: 0.0,
            max_items,
            mastery_theta: None,
            max_stall_count: 0,
        }
    }

    /// Set the target standard error.
    pub fn with_target_standard_error(mut self, target: f64) -> Self {
        self.target_standard_error = target;
        self
    }

    /// Set the mastery theta threshold.
    pub fn with_mastery_theta(mut self, theta: Option<f64>) -> Self {
        self.mastery_theta = theta;
        self
    }

    /// Set the stall limit.
    pub fn with_max_stall_count(mut self, count: u32) -> Self {
        self.max_stall_count = count;
        self
    }

    /// Reject criteria that are malformed.
    pub fn validate(&self) -> CatResult<()> {
        if self.max_items == 0 {
            return Err(CatError::InvalidCriteria(
                "max_items must be at least 1".to_string(),
            ));
        }
        if !self.target_standard_error.is_finite() || self.target_standard_error < 0.0 {
            return Err(CatError::InvalidCriteria(format!(
                "target_standard_error must be finite and non-negative, got {}",
                self.target_standard_error
            )));
        }
        if let Some(theta) = self.mastery_theta {
            if !theta.is_finite() {
                return Err(CatError::InvalidCriteria(format!(
                    "mastery_theta must be finite, got {}",
                    theta
                )));
            }
        }
        Ok(())
    }

    /// First satisfied stop condition, if any.
    pub fn evaluate(
        &self,
        response_count: usize,
        ability: &AbilityEstimate,
        stall_count: u32,
    ) -> Option<TerminationReason> {
        TerminationReason::CHECK_ORDER
            .into_iter()
            .find(|reason| match reason {
                TerminationReason::MaxItems => response_count >= self.max_items,
                TerminationReason::TargetStandardError => {
                    ability.standard_error <= self.target_standard_error
                }
                TerminationReason::MasteryTheta => self
                    .mastery_theta
                    .map(|threshold| ability.theta >= threshold)
                    .unwrap_or(false),
                TerminationReason::Stalled => {
                    self.max_stall_count > 0 && stall_count >= self.max_stall_count
                }
                TerminationReason::PoolExhausted => false,
            })
    }
}

/// A recorded answer to one administered item. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResponse {
    /// Position in the session (1-based).
    pub sequence: u32,
    /// Item answered.
    pub item_id: String,
    /// Concepts the item speaks to.
    pub concept_ids: Vec<String>,
    /// Whether the answer was correct.
    pub is_correct: bool,
    /// 1.0 for correct, 0.0 otherwise.
    pub score: f64,
    /// Model probability of a correct answer before the update.
    pub expected_probability: f64,
    /// Information used in the update (after flooring).
    pub information: f64,
    /// Time the learner took, in milliseconds.
    pub response_time_ms: u64,
    /// What the learner actually answered.
    pub raw_response: String,
    /// Ability estimate after this response.
    pub ability_after: AbilityEstimate,
}

/// How far a session has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionProgress {
    /// Responses recorded.
    pub completed: usize,
    /// Size of the pool at session start.
    pub total: usize,
    /// `completed / total` as a percentage, one decimal.
    pub percent: f64,
}

/// Final, read-only summary of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub learner_id: String,
    pub completed: bool,
    pub termination: Option<TerminationReason>,
    pub final_ability: AbilityEstimate,
    pub items_administered: usize,
    pub correct_count: usize,
    pub responses: Vec<ItemResponse>,
}

/// A computerized adaptive test for one learner.
///
/// Strict alternation is expected: `advance_to_next_item`, then
/// `record_response`, then `advance_to_next_item` again.
#[derive(Debug, Clone)]
pub struct AdaptiveSession {
    id: String,
    learner: LearnerProfile,
    criteria: TerminationCriteria,
    remaining: Vec<Item>,
    pool_size: usize,
    responses: Vec<ItemResponse>,
    current_ability: AbilityEstimate,
    active_item: Option<Item>,
    completed: bool,
    stall_count: u32,
    termination: Option<TerminationReason>,
}

impl AdaptiveSession {
    /// Create a session with the neutral prior (theta 0, standard error 1).
    pub fn new(
        id: impl Into<String>,
        learner: LearnerProfile,
        item_pool: Vec<Item>,
        criteria: TerminationCriteria,
    ) -> CatResult<Self> {
        if learner.id.trim().is_empty() {
            return Err(CatError::InvalidLearner("id is required".to_string()));
        }
        criteria.validate()?;

        let pool_size = item_pool.len();
        Ok(Self {
            id: id.into(),
            learner,
            criteria,
            remaining: item_pool,
            pool_size,
            responses: Vec::new(),
            current_ability: AbilityEstimate::default(),
            active_item: None,
            completed: false,
            stall_count: 0,
            termination: None,
        })
    }

    /// Replace the starting ability estimate. Only meaningful before the first response.
    pub fn with_initial_ability(mut self, ability: AbilityEstimate) -> Self {
        self.current_ability = ability;
        self
    }

    /// Select, remove and activate the most informative remaining item.
    ///
    /// Ties keep the item that appears first in the pool.
    pub fn advance_to_next_item(&mut self) -> Option<&Item> {
        if self.completed {
            self.active_item = None;
            return None;
        }

        let theta = self.current_ability.theta;
        let mut best: Option<(usize, f64)> = None;
        for (idx, item) in self.remaining.iter().enumerate() {
            let info = item.parameter.fisher_information(theta);
            let better = match best {
                None => true,
                Some((_, best_info)) => info > best_info,
            };
            if better {
                best = Some((idx, info));
            }
        }

        let Some((idx, info)) = best else {
            self.finish(TerminationReason::PoolExhausted);
            self.active_item = None;
            return None;
        };

        let item = self.remaining.remove(idx);
        log::debug!(
            "session {}: selected item {} (information {:.4} at theta {:.3}, {} left)",
            self.id,
            item.id,
            info,
            theta,
            self.remaining.len()
        );
        self.active_item = Some(item);
        self.active_item.as_ref()
    }

    /// Score the active item, update ability and check termination.
    pub fn record_response(
        &mut self,
        is_correct: bool,
        response_time_ms: u64,
        raw_response: impl Into<String>,
    ) -> CatResult<ItemResponse> {
        self.record_response_at(is_correct, response_time_ms, raw_response, now_micros())
    }

    /// Same as [`record_response`](Self::record_response) with an injected clock.
    pub fn record_response_at(
        &mut self,
        is_correct: bool,
        response_time_ms: u64,
        raw_response: impl Into<String>,
        now: u64,
    ) -> CatResult<ItemResponse> {
        let item = self.active_item.take().ok_or(CatError::NoActiveItem)?;

        let theta = self.current_ability.theta;
        let probability = item.parameter.probability_correct(theta);
        let score = if is_correct { 1.0 } else { 0.0 };
        let info = item
            .parameter
            .fisher_information(theta)
            .max(INFORMATION_FLOOR);

        let new_theta = (theta + (score - probability) / info).clamp(THETA_MIN, THETA_MAX);
        let standard_error = 1.0 / info.sqrt();
        let ability = AbilityEstimate::new(
            new_theta,
            standard_error,
            EstimationMethod::NewtonStep,
            now,
        );

        if (new_theta - theta).abs() < STALL_THRESHOLD {
            self.stall_count += 1;
        } else {
            self.stall_count = 0;
        }

        let response = ItemResponse {
            sequence: self.responses.len() as u32 + 1,
            item_id: item.id,
            concept_ids: item.concept_ids,
            is_correct,
            score,
            expected_probability: probability,
            information: info,
            response_time_ms,
            raw_response: raw_response.into(),
            ability_after: ability,
        };
        log::debug!(
            "session {}: item {} {} (p={:.3}), theta {:.3} -> {:.3}, se {:.3}",
            self.id,
            response.item_id,
            if is_correct { "correct" } else { "incorrect" },
            probability,
            theta,
            new_theta,
            standard_error
        );

        self.current_ability = ability;
        self.responses.push(response.clone());

        if let Some(reason) =
            self.criteria
                .evaluate(self.responses.len(), &self.current_ability, self.stall_count)
        {
            self.finish(reason);
        }

        Ok(response)
    }

    fn finish(&mut self, reason: TerminationReason) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.termination = Some(reason);
        log::info!(
            "session {} complete ({}): {} responses, theta {:.3}, se {:.3}",
            self.id,
            reason,
            self.responses.len(),
            self.current_ability.theta,
            self.current_ability.standard_error
        );
    }

    /// Session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The learner taking this session.
    pub fn learner(&self) -> &LearnerProfile {
        &self.learner
    }

    /// Termination criteria in force.
    pub fn criteria(&self) -> &TerminationCriteria {
        &self.criteria
    }

    /// Whether the session has reached a terminal state.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Why the session stopped, once complete.
    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Latest ability estimate.
    pub fn current_ability(&self) -> &AbilityEstimate {
        &self.current_ability
    }

    /// The item awaiting a response, if any.
    pub fn active_item(&self) -> Option<&Item> {
        self.active_item.as_ref()
    }

    /// Whether an item is awaiting a response.
    pub fn has_active_item(&self) -> bool {
        self.active_item.is_some()
    }

    /// Responses recorded so far, in order.
    pub fn responses(&self) -> &[ItemResponse] {
        &self.responses
    }

    /// Items not yet administered.
    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }

    /// Current consecutive non-informative response count.
    pub fn stall_count(&self) -> u32 {
        self.stall_count
    }

    /// Completed / total responses.
    pub fn progress(&self) -> SessionProgress {
        let completed = self.responses.len();
        let total = self.pool_size;
        let percent = (completed as f64 / total.max(1) as f64 * 1000.0).round() / 10.0;
        SessionProgress {
            completed,
            total,
            percent,
        }
    }

    /// Snapshot the session for reporting.
    pub fn report(&self) -> SessionReport {
        SessionReport {
            session_id: self.id.clone(),
            learner_id: self.learner.id.clone(),
            completed: self.completed,
            termination: self.termination,
            final_ability: self.current_ability,
            items_administered: self.responses.len(),
            correct_count: self.responses.iter().filter(|r| r.is_correct).count(),
            responses: self.responses.clone(),
        }
    }

    /// Projected ability over the next `horizon` items from the remaining pool.
    pub fn forecast(&self, horizon: usize) -> PredictivePlot {
        predictive_plot(&self.current_ability, &self.remaining, horizon)
    }

    /// One evidence record per response, ready for the learner's mastery graph.
    pub fn evidence(&self) -> Vec<EvidenceRecord> {
        self.responses
            .iter()
            .map(|r| {
                EvidenceRecord::new(r.concept_ids.iter().cloned(), r.is_correct)
                    .latency_ms(r.response_time_ms)
                    .at(r.ability_after.timestamp)
            })
            .collect()
    }
}
