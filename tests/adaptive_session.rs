//! Adaptive session tests: selection, ability update, termination, reporting.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cat_mastery::engine::forecast::{MAX_FORECAST_PROBABILITY, MIN_FORECAST_PROBABILITY};
use cat_mastery::engine::session::INFORMATION_FLOOR;
use cat_mastery::engine::{
    predictive_plot, with_due_reviews, AdaptiveSession, TerminationCriteria, TerminationReason,
};
use cat_mastery::graph::MasteryGraph;
use cat_mastery::types::{
    AbilityEstimate, CatError, EstimationMethod, EvidenceRecord, Item, ItemBuilder, ItemFormat,
    LearnerProfile, THETA_MAX,
};

const DAY: u64 = 86_400_000_000;

// ==================== Helpers ====================

fn item(id: &str, difficulty: f64, discrimination: f64, guessing: f64) -> Item {
    ItemBuilder::new(id, format!("Question {}", id))
        .format(ItemFormat::ShortAnswer)
        .parameter(difficulty, discrimination, guessing)
        .concept(format!("concept-{}", id))
        .build()
        .unwrap()
}

fn learner() -> LearnerProfile {
    LearnerProfile::new("learner-1", "Ada", vec!["pass the exam".to_string()]).unwrap()
}

fn session(pool: Vec<Item>, criteria: TerminationCriteria) -> AdaptiveSession {
    AdaptiveSession::new("s1", learner(), pool, criteria).unwrap()
}

/// Items so easy that a correct answer barely moves theta.
fn trivial_pool(n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| item(&format!("easy{}", i), -10.0, 2.0, 0.0))
        .collect()
}

// ==================== Creation ====================

#[test]
fn test_new_session_starts_at_neutral_prior() {
    let s = session(vec![item("a", 0.0, 1.0, 0.2)], TerminationCriteria::default());
    assert!(!s.is_complete());
    assert!(!s.has_active_item());
    assert_eq!(s.current_ability().theta, 0.0);
    assert_eq!(s.current_ability().standard_error, 1.0);
    assert_eq!(s.current_ability().method, EstimationMethod::Prior);
    assert_eq!(s.remaining_count(), 1);
}

#[test]
fn test_rejects_zero_max_items() {
    let err = AdaptiveSession::new(
        "s1",
        learner(),
        vec![],
        TerminationCriteria::max_items(0),
    )
    .unwrap_err();
    assert!(matches!(err, CatError::InvalidCriteria(_)));
}

#[test]
fn test_rejects_non_finite_criteria() {
    let criteria = TerminationCriteria::max_items(5).with_target_standard_error(f64::NAN);
    let err = AdaptiveSession::new("s1", learner(), vec![], criteria).unwrap_err();
    assert!(matches!(err, CatError::InvalidCriteria(_)));

    let criteria = TerminationCriteria::max_items(5).with_mastery_theta(Some(f64::INFINITY));
    let err = AdaptiveSession::new("s1", learner(), vec![], criteria).unwrap_err();
    assert!(matches!(err, CatError::InvalidCriteria(_)));
}

#[test]
fn test_learner_requires_id_and_name() {
    assert!(matches!(
        LearnerProfile::new("  ", "Ada", Vec::new()),
        Err(CatError::InvalidLearner(_))
    ));
    assert!(matches!(
        LearnerProfile::new("l1", "", Vec::new()),
        Err(CatError::InvalidLearner(_))
    ));
}

// ==================== Selection ====================

#[test]
fn test_selects_most_informative_item() {
    let pool = vec![
        item("hard", 2.0, 1.0, 0.0),
        item("centered", 0.0, 1.0, 0.0),
        item("easy", -2.0, 1.0, 0.0),
    ];
    let mut s = session(pool, TerminationCriteria::max_items(10));
    let selected = s.advance_to_next_item().unwrap();
    assert_eq!(selected.id, "centered");
    assert_eq!(s.remaining_count(), 2);
    assert!(s.has_active_item());
}

#[test]
fn test_tie_break_keeps_first_in_pool() {
    let pool = vec![
        item("first", 0.0, 1.0, 0.2),
        item("second", 0.0, 1.0, 0.2),
    ];
    let mut s = session(pool, TerminationCriteria::max_items(10));
    assert_eq!(s.advance_to_next_item().unwrap().id, "first");
}

#[test]
fn test_higher_discrimination_preferred_at_equal_difficulty() {
    let pool = vec![item("low", 0.0, 0.7, 0.2), item("high", 0.0, 1.8, 0.2)];
    let mut s = session(pool, TerminationCriteria::max_items(10));
    assert_eq!(s.advance_to_next_item().unwrap().id, "high");
}

#[test]
fn test_selection_matches_max_information_on_random_pools() {
    let mut rng = StdRng::seed_from_u64(42);
    for round in 0..20 {
        let pool: Vec<Item> = (0..30)
            .map(|i| {
                item(
                    &format!("r{}-{}", round, i),
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(0.3..2.5),
                    rng.gen_range(0.0..0.35),
                )
            })
            .collect();
        let theta = rng.gen_range(-2.0..2.0);
        let expected = pool
            .iter()
            .map(|it| it.parameter.fisher_information(theta))
            .fold(f64::MIN, f64::max);

        let mut s = AdaptiveSession::new("s", learner(), pool, TerminationCriteria::max_items(30))
            .unwrap()
            .with_initial_ability(AbilityEstimate::prior(theta, 1.0));
        let chosen = s.advance_to_next_item().unwrap();
        assert_eq!(chosen.parameter.fisher_information(theta), expected);
    }
}

#[test]
fn test_administered_items_never_repeat() {
    let pool: Vec<Item> = (0..6)
        .map(|i| item(&format!("i{}", i), i as f64 - 3.0, 1.0, 0.2))
        .collect();
    let mut s = session(pool, TerminationCriteria::max_items(6));
    let mut seen = Vec::new();
    while let Some(next) = s.advance_to_next_item() {
        let id = next.id.clone();
        assert!(!seen.contains(&id));
        seen.push(id);
        s.record_response(seen.len() % 2 == 0, 1000, "answer").unwrap();
    }
    assert_eq!(seen.len(), 6);
    assert_eq!(s.remaining_count(), 0);
}

// ==================== Ability Update ====================

#[test]
fn test_record_without_active_item_fails() {
    let mut s = session(vec![item("a", 0.0, 1.0, 0.2)], TerminationCriteria::max_items(5));
    let err = s.record_response(true, 500, "x").unwrap_err();
    assert!(matches!(err, CatError::NoActiveItem));
    assert!(s.responses().is_empty());
}

#[test]
fn test_record_twice_fails_second_time() {
    let mut s = session(
        vec![item("a", 0.0, 1.0, 0.2), item("b", 0.0, 1.0, 0.2)],
        TerminationCriteria::max_items(5),
    );
    s.advance_to_next_item();
    s.record_response(true, 500, "x").unwrap();
    assert!(matches!(
        s.record_response(true, 500, "x"),
        Err(CatError::NoActiveItem)
    ));
    assert_eq!(s.responses().len(), 1);
}

#[test]
fn test_correct_response_newton_step() {
    let mut s = session(vec![item("a", 0.0, 2.0, 0.0)], TerminationCriteria::max_items(5));
    s.advance_to_next_item();
    let response = s.record_response_at(true, 1200, "B", 1_000).unwrap();

    // p = 0.5, information = 1.0
    assert!((response.expected_probability - 0.5).abs() < 1e-12);
    assert!((response.information - 1.0).abs() < 1e-9);
    assert!((s.current_ability().theta - 0.5).abs() < 1e-9);
    assert!((s.current_ability().standard_error - 1.0).abs() < 1e-9);
    assert_eq!(s.current_ability().method, EstimationMethod::NewtonStep);
    assert_eq!(s.current_ability().timestamp, 1_000);
    assert_eq!(response.score, 1.0);
    assert_eq!(response.sequence, 1);
    assert_eq!(response.raw_response, "B");
    assert_eq!(response.response_time_ms, 1200);
}

#[test]
fn test_incorrect_response_lowers_theta() {
    let mut s = session(vec![item("a", 0.0, 2.0, 0.0)], TerminationCriteria::max_items(5));
    s.advance_to_next_item();
    let response = s.record_response(false, 800, "A").unwrap();
    assert_eq!(response.score, 0.0);
    assert!((s.current_ability().theta + 0.5).abs() < 1e-9);
}

#[test]
fn test_information_floor_and_theta_clamp() {
    // Information 2.5e-5 at theta 0, floored to 1e-3.
    let mut s = session(vec![item("flat", 0.0, 0.01, 0.0)], TerminationCriteria::max_items(5));
    s.advance_to_next_item();
    let response = s.record_response(true, 100, "x").unwrap();
    assert_eq!(response.information, INFORMATION_FLOOR);
    assert_eq!(s.current_ability().theta, 3.0);
    assert!((s.current_ability().standard_error - 1.0 / INFORMATION_FLOOR.sqrt()).abs() < 1e-9);
}

#[test]
fn test_theta_clamped_below() {
    let mut s = session(vec![item("flat", 0.0, 0.01, 0.0)], TerminationCriteria::max_items(5));
    s.advance_to_next_item();
    s.record_response(false, 100, "x").unwrap();
    assert_eq!(s.current_ability().theta, -3.0);
}

#[test]
fn test_response_snapshots_ability() {
    let pool = vec![item("a", 0.0, 1.5, 0.2), item("b", 0.5, 1.5, 0.2)];
    let mut s = session(pool, TerminationCriteria::max_items(5));
    s.advance_to_next_item();
    s.record_response(true, 100, "x").unwrap();
    let first = s.responses()[0].ability_after;
    s.advance_to_next_item();
    s.record_response(false, 100, "y").unwrap();

    assert_eq!(s.responses()[0].ability_after, first);
    assert_eq!(s.responses()[1].ability_after, *s.current_ability());
    assert_eq!(s.responses()[1].sequence, 2);
}

// ==================== Termination ====================

#[test]
fn test_terminates_on_max_items() {
    let pool: Vec<Item> = (0..5).map(|i| item(&format!("i{}", i), 0.0, 1.0, 0.2)).collect();
    let mut s = session(pool, TerminationCriteria::max_items(2));
    for _ in 0..2 {
        s.advance_to_next_item().unwrap();
        s.record_response(true, 100, "x").unwrap();
    }
    assert!(s.is_complete());
    assert_eq!(s.termination(), Some(TerminationReason::MaxItems));
    assert!(s.advance_to_next_item().is_none());
    assert!(!s.has_active_item());
    assert_eq!(s.remaining_count(), 3);
}

#[test]
fn test_pool_exhausted_on_advance() {
    let mut s = session(vec![item("only", 0.0, 1.0, 0.2)], TerminationCriteria::max_items(10));
    s.advance_to_next_item().unwrap();
    s.record_response(true, 100, "x").unwrap();
    assert!(!s.is_complete());

    assert!(s.advance_to_next_item().is_none());
    assert!(s.is_complete());
    assert_eq!(s.termination(), Some(TerminationReason::PoolExhausted));
}

#[test]
fn test_empty_pool_completes_immediately() {
    let mut s = session(Vec::new(), TerminationCriteria::default());
    assert!(s.advance_to_next_item().is_none());
    assert!(s.is_complete());
    assert_eq!(s.termination(), Some(TerminationReason::PoolExhausted));
    assert_eq!(s.progress().percent, 0.0);
}

#[test]
fn test_terminates_on_target_standard_error() {
    let criteria = TerminationCriteria::max_items(10).with_target_standard_error(1.0);
    let mut s = session(
        vec![item("a", 0.0, 2.0, 0.0), item("b", 0.0, 2.0, 0.0)],
        criteria,
    );
    s.advance_to_next_item();
    s.record_response(false, 100, "x").unwrap();
    assert_eq!(s.termination(), Some(TerminationReason::TargetStandardError));
}

#[test]
fn test_terminates_on_mastery_theta() {
    let criteria = TerminationCriteria::max_items(10).with_mastery_theta(Some(0.4));
    let mut s = session(
        vec![item("a", 0.0, 2.0, 0.0), item("b", 0.0, 2.0, 0.0)],
        criteria,
    );
    s.advance_to_next_item();
    s.record_response(true, 100, "x").unwrap();
    assert_eq!(s.termination(), Some(TerminationReason::MasteryTheta));
}

#[test]
fn test_incorrect_answer_does_not_reach_mastery_theta() {
    let criteria = TerminationCriteria::max_items(10).with_mastery_theta(Some(0.4));
    let mut s = session(
        vec![item("a", 0.0, 2.0, 0.0), item("b", 0.0, 2.0, 0.0)],
        criteria,
    );
    s.advance_to_next_item();
    s.record_response(false, 100, "x").unwrap();
    assert!(!s.is_complete());
}

#[test]
fn test_max_items_checked_before_other_conditions() {
    let criteria = TerminationCriteria::max_items(1)
        .with_target_standard_error(5.0)
        .with_mastery_theta(Some(-3.0));
    let mut s = session(vec![item("a", 0.0, 2.0, 0.0)], criteria);
    s.advance_to_next_item();
    s.record_response(true, 100, "x").unwrap();
    assert_eq!(s.termination(), Some(TerminationReason::MaxItems));
}

#[test]
fn test_standard_error_checked_before_mastery_theta() {
    let criteria = TerminationCriteria::max_items(10)
        .with_target_standard_error(5.0)
        .with_mastery_theta(Some(-3.0));
    let mut s = session(vec![item("a", 0.0, 2.0, 0.0), item("b", 0.0, 2.0, 0.0)], criteria);
    s.advance_to_next_item();
    s.record_response(true, 100, "x").unwrap();
    assert_eq!(s.termination(), Some(TerminationReason::TargetStandardError));
}

#[test]
fn test_terminates_when_stalled() {
    let criteria = TerminationCriteria::max_items(10).with_max_stall_count(3);
    let mut s = session(trivial_pool(6), criteria);
    for _ in 0..3 {
        s.advance_to_next_item().unwrap();
        s.record_response(true, 100, "x").unwrap();
    }
    assert_eq!(s.stall_count(), 3);
    assert_eq!(s.termination(), Some(TerminationReason::Stalled));
    assert_eq!(s.remaining_count(), 3);
}

#[test]
fn test_stall_check_disabled_with_zero() {
    let mut s = session(trivial_pool(4), TerminationCriteria::max_items(10));
    while s.advance_to_next_item().is_some() {
        s.record_response(true, 100, "x").unwrap();
    }
    assert_eq!(s.responses().len(), 4);
    assert_eq!(s.termination(), Some(TerminationReason::PoolExhausted));
}

#[test]
fn test_informative_response_resets_stall_counter() {
    // A very sharp item is selected first; its information is so high that
    // even a surprising answer moves theta by less than the stall threshold.
    let pool = vec![item("sharp", 0.0, 20.0, 0.0), item("broad", 0.0, 1.0, 0.0)];
    let criteria = TerminationCriteria::max_items(10).with_max_stall_count(5);
    let mut s = session(pool, criteria);

    assert_eq!(s.advance_to_next_item().unwrap().id, "sharp");
    s.record_response(true, 100, "x").unwrap();
    assert_eq!(s.stall_count(), 1);

    assert_eq!(s.advance_to_next_item().unwrap().id, "broad");
    s.record_response(true, 100, "x").unwrap();
    assert_eq!(s.stall_count(), 0);
}

#[test]
fn test_no_activation_after_completion() {
    let mut s = session(
        vec![item("a", 0.0, 1.0, 0.2), item("b", 0.0, 1.0, 0.2)],
        TerminationCriteria::max_items(1),
    );
    s.advance_to_next_item();
    s.record_response(true, 100, "x").unwrap();
    assert!(s.is_complete());
    for _ in 0..3 {
        assert!(s.advance_to_next_item().is_none());
    }
    assert_eq!(s.remaining_count(), 1);
    assert!(matches!(
        s.record_response(true, 100, "x"),
        Err(CatError::NoActiveItem)
    ));
}

// ==================== Reporting ====================

#[test]
fn test_report_and_progress() {
    let pool: Vec<Item> = (0..4).map(|i| item(&format!("i{}", i), 0.0, 1.0, 0.2)).collect();
    let mut s = session(pool, TerminationCriteria::max_items(3));
    let answers = [true, false, true];
    for correct in answers {
        s.advance_to_next_item().unwrap();
        s.record_response(correct, 250, "x").unwrap();
    }

    let progress = s.progress();
    assert_eq!(progress.completed, 3);
    assert_eq!(progress.total, 4);
    assert_eq!(progress.percent, 75.0);

    let report = s.report();
    assert_eq!(report.session_id, "s1");
    assert_eq!(report.learner_id, "learner-1");
    assert!(report.completed);
    assert_eq!(report.termination, Some(TerminationReason::MaxItems));
    assert_eq!(report.items_administered, 3);
    assert_eq!(report.correct_count, 2);
    assert_eq!(report.final_ability, *s.current_ability());
    assert_eq!(report.responses.len(), 3);

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"termination\":\"max_items\""));
}

#[test]
fn test_evidence_one_record_per_response() {
    let mut s = session(
        vec![item("a", 0.0, 1.0, 0.2), item("b", 0.3, 1.0, 0.2)],
        TerminationCriteria::max_items(5),
    );
    s.advance_to_next_item();
    s.record_response_at(true, 900, "x", 10).unwrap();
    s.advance_to_next_item();
    s.record_response_at(false, 1500, "y", 20).unwrap();

    let evidence = s.evidence();
    assert_eq!(evidence.len(), 2);
    assert_eq!(evidence[0].concept_ids, vec!["concept-a".to_string()]);
    assert!(evidence[0].is_correct);
    assert_eq!(evidence[0].latency_ms, 900);
    assert_eq!(evidence[0].timestamp, 10);
    assert!(!evidence[1].is_correct);
    assert_eq!(evidence[1].timestamp, 20);
}

// ==================== Review Re-injection ====================

fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

#[test]
fn test_due_concepts_add_bank_items() {
    let bank = vec![
        item("a", 0.0, 1.0, 0.2),
        item("b", 0.5, 1.0, 0.2),
        item("c", 1.0, 1.0, 0.2),
    ];
    let mut mastery = MasteryGraph::new("learner-1");
    mastery.apply_evidence(&EvidenceRecord::new(["concept-b"], true).at(10));

    let pool = with_due_reviews(vec![bank[0].clone()], &bank, &mastery, 10 + DAY);
    assert_eq!(ids(&pool), vec!["a", "b"]);
}

#[test]
fn test_due_review_items_not_duplicated() {
    let bank = vec![item("a", 0.0, 1.0, 0.2), item("b", 0.5, 1.0, 0.2)];
    let mut mastery = MasteryGraph::new("learner-1");
    mastery.apply_evidence(&EvidenceRecord::new(["concept-a", "concept-b"], false).at(10));

    let pool = with_due_reviews(bank.clone(), &bank, &mastery, 10 + DAY);
    assert_eq!(ids(&pool), vec!["a", "b"]);
}

#[test]
fn test_pool_unchanged_when_nothing_due() {
    let bank = vec![item("a", 0.0, 1.0, 0.2), item("b", 0.5, 1.0, 0.2)];
    let mut mastery = MasteryGraph::new("learner-1");
    mastery.apply_evidence(&EvidenceRecord::new(["concept-b"], true).at(10));

    let pool = with_due_reviews(vec![bank[0].clone()], &bank, &mastery, 10 + DAY - 1);
    assert_eq!(ids(&pool), vec!["a"]);

    let empty = MasteryGraph::new("learner-1");
    let pool = with_due_reviews(Vec::new(), &bank, &empty, u64::MAX);
    assert!(pool.is_empty());
}

// ==================== Forecast ====================

#[test]
fn test_forecast_band_narrows_and_contains_expectation() {
    let ability = AbilityEstimate::prior(-0.8, 0.7);
    let items = vec![item("a", -1.0, 1.2, 0.2), item("b", 0.0, 1.0, 0.25)];
    let plot = predictive_plot(&ability, &items, 5);

    assert_eq!(plot.horizon, 5);
    assert_eq!(plot.baseline_theta, -0.8);
    assert_eq!(plot.baseline_standard_error, 0.7);
    assert!(plot.prob_correct >= MIN_FORECAST_PROBABILITY);
    assert!(plot.prob_correct <= MAX_FORECAST_PROBABILITY);
    assert_eq!(plot.points.len(), 5);

    let first = plot.points[0];
    assert_eq!(first.step, 1);
    assert!((first.expected_theta - (-0.8 + 0.05 * plot.prob_correct)).abs() < 1e-12);

    for point in &plot.points {
        assert!(point.lower_theta <= point.expected_theta);
        assert!(point.expected_theta <= point.upper_theta);
    }
    for pair in plot.points.windows(2) {
        assert_eq!(pair[1].step, pair[0].step + 1);
        assert!(pair[1].expected_theta >= pair[0].expected_theta);
        let before = pair[0].upper_theta - pair[0].lower_theta;
        let after = pair[1].upper_theta - pair[1].lower_theta;
        assert!(after < before);
    }
}

#[test]
fn test_forecast_probability_bounded() {
    let ability = AbilityEstimate::prior(3.0, 0.3);
    let trivial = trivial_pool(2);
    let plot = predictive_plot(&ability, &trivial, 3);
    assert_eq!(plot.prob_correct, MAX_FORECAST_PROBABILITY);

    let low = AbilityEstimate::prior(-3.0, 0.3);
    let hard = vec![item("h", 3.0, 2.5, 0.0)];
    let plot = predictive_plot(&low, &hard, 3);
    assert_eq!(plot.prob_correct, MIN_FORECAST_PROBABILITY);
}

#[test]
fn test_forecast_stays_on_theta_scale() {
    let ability = AbilityEstimate::prior(2.99, 2.0);
    let plot = predictive_plot(&ability, &trivial_pool(1), 10);
    for point in &plot.points {
        assert!(point.expected_theta <= THETA_MAX);
        assert!(point.upper_theta <= THETA_MAX);
        assert!(point.lower_theta >= -THETA_MAX);
    }
    assert_eq!(plot.points[9].expected_theta, THETA_MAX);
}

#[test]
fn test_forecast_edge_cases() {
    let ability = AbilityEstimate::default();
    let none = predictive_plot(&ability, &[item("a", 0.0, 1.0, 0.2)], 0);
    assert!(none.points.is_empty());

    let no_items = predictive_plot(&ability, &[], 3);
    assert_eq!(no_items.points.len(), 3);
    assert!(no_items.prob_correct >= MIN_FORECAST_PROBABILITY);
    assert!(no_items.points.iter().all(|p| p.expected_theta.is_finite()));
}

#[test]
fn test_session_forecast_uses_remaining_pool() {
    let b = item("b", 1.0, 1.0, 0.2);
    let c = item("c", -1.0, 1.0, 0.2);
    let mut s = session(
        vec![item("a", 0.0, 2.0, 0.0), b.clone(), c.clone()],
        TerminationCriteria::max_items(3),
    );
    assert_eq!(s.advance_to_next_item().unwrap().id, "a");
    s.record_response_at(true, 0, "x", 10).unwrap();

    let plot = s.forecast(4);
    assert_eq!(plot, predictive_plot(s.current_ability(), &[b, c], 4));
    assert_eq!(plot.baseline_theta, s.current_ability().theta);
}
