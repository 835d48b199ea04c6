//! Spaced-repetition review schedule.
//!
//! Every correct answer stretches the interval before the next review; a miss
//! resets it. Concepts whose review time has passed are fed back into the
//! item pool of the next session.

use std::collections::HashSet;

use crate::graph::MasteryGraph;
use crate::types::{ConceptMastery, Item, MICROS_PER_DAY};

/// Interval after a first success or any miss.
pub const INITIAL_INTERVAL_DAYS: f64 = 1.0;

/// Interval multiplier per consecutive success.
pub const INTERVAL_GROWTH: f64 = 2.5;

/// Longest interval ever scheduled.
pub const MAX_INTERVAL_DAYS: f64 = 180.0;

/// Interval following one answer, given the current one.
pub fn next_interval(current_days: f64, is_correct: bool) -> f64 {
    if !is_correct || current_days <= 0.0 || !current_days.is_finite() {
        return INITIAL_INTERVAL_DAYS;
    }
    (current_days * INTERVAL_GROWTH).min(MAX_INTERVAL_DAYS)
}

/// Update the interval and schedule the next review relative to `answered_at`.
pub fn schedule_review(mastery: &mut ConceptMastery, is_correct: bool, answered_at: u64) {
    let interval = next_interval(mastery.review_interval_days, is_correct);
    mastery.review_interval_days = interval;
    let offset = (interval * MICROS_PER_DAY) as u64;
    mastery.next_review_at = Some(answered_at.saturating_add(offset));
}

/// `pool` plus every item from `bank` that targets a concept due for review.
///
/// Items already in the pool are not duplicated; bank order is kept.
pub fn with_due_reviews(
    mut pool: Vec<Item>,
    bank: &[Item],
    mastery: &MasteryGraph,
    now: u64,
) -> Vec<Item> {
    let due: HashSet<&str> = mastery
        .due_for_review(now)
        .into_iter()
        .map(|m| m.concept_id.as_str())
        .collect();
    if due.is_empty() {
        return pool;
    }

    let mut present: HashSet<String> = pool.iter().map(|item| item.id.clone()).collect();
    let before = pool.len();
    for item in bank {
        if present.contains(&item.id) {
            continue;
        }
        if item.concept_ids.iter().any(|c| due.contains(c.as_str())) {
            present.insert(item.id.clone());
            pool.push(item.clone());
        }
    }
    log::debug!(
        "re-injected {} review item(s) for {} due concept(s)",
        pool.len() - before,
        due.len()
    );
    pool
}
