//! Item model tests: 3PL probability, Fisher information, item validation.

use cat_mastery::engine::irt::{fisher_information, probability_correct, sigmoid};
use cat_mastery::types::{CatError, ItemBuilder, ItemFormat, ItemParameter};

// ==================== Probability ====================

#[test]
fn test_probability_at_difficulty_is_midpoint() {
    let param = ItemParameter::new(0.5, 1.3, 0.2);
    let p = probability_correct(&param, 0.5);
    // c + (1 - c) / 2
    assert!((p - 0.6).abs() < 1e-12);
}

#[test]
fn test_probability_bounded_by_guessing() {
    let param = ItemParameter::new(0.0, 1.0, 0.25);
    for theta in [-100.0, -3.0, 0.0, 3.0, 100.0] {
        let p = param.probability_correct(theta);
        assert!(p >= 0.25, "p={} below guessing at theta={}", p, theta);
        assert!(p < 1.0, "p={} reached 1 at theta={}", p, theta);
    }

    // Steep items with a near-certain guess still stay strictly below 1.
    for guessing in [0.99, 0.999, 0.999999] {
        let param = ItemParameter::new(-3.0, 50.0, guessing);
        let p = param.probability_correct(3.0);
        assert!(p >= guessing, "p={} below guessing {}", p, guessing);
        assert!(p < 1.0, "p={} reached 1 with guessing {}", p, guessing);
        assert!(param.fisher_information(3.0).is_finite());
    }
}

#[test]
fn test_probability_monotone_in_theta() {
    let param = ItemParameter::new(0.3, 1.7, 0.1);
    let mut prev = param.probability_correct(-3.0);
    let mut theta = -3.0;
    while theta <= 3.0 {
        let p = param.probability_correct(theta);
        assert!(p >= prev);
        prev = p;
        theta += 0.25;
    }
}

#[test]
fn test_sigmoid_extreme_inputs_stay_finite() {
    assert!(sigmoid(1e6).is_finite());
    assert!(sigmoid(-1e6).is_finite());
    assert!(sigmoid(1e6) < 1.0);
    assert!(sigmoid(-1e6) > 0.0);
}

#[test]
fn test_extreme_discrimination_does_not_overflow() {
    let param = ItemParameter::new(0.0, 1e9, 0.0);
    let p = param.probability_correct(2.0);
    assert!(p.is_finite());
    let info = param.fisher_information(2.0);
    assert!(info.is_finite());
    assert!(info >= 0.0);
}

// ==================== Information ====================

#[test]
fn test_information_peaks_near_difficulty_without_guessing() {
    let param = ItemParameter::new(1.0, 2.0, 0.0);
    let at_b = fisher_information(&param, 1.0);
    // a^2 * p * q with p = q = 0.5
    assert!((at_b - 1.0).abs() < 1e-9);
    assert!(fisher_information(&param, 0.0) < at_b);
    assert!(fisher_information(&param, 2.0) < at_b);
}

#[test]
fn test_information_zero_for_pure_guess_item() {
    let param = ItemParameter::new(0.0, 1.5, 1.0);
    assert_eq!(param.fisher_information(0.0), 0.0);
    assert_eq!(param.fisher_information(2.5), 0.0);
}

#[test]
fn test_information_non_negative() {
    let params = [
        ItemParameter::new(-2.0, 0.5, 0.0),
        ItemParameter::new(0.0, 1.0, 0.2),
        ItemParameter::new(2.5, 2.5, 0.35),
    ];
    for param in &params {
        let mut theta = -3.0;
        while theta <= 3.0 {
            assert!(param.fisher_information(theta) >= 0.0);
            theta += 0.5;
        }
    }
}

#[test]
fn test_higher_discrimination_more_informative_at_difficulty() {
    let low = ItemParameter::new(0.0, 0.8, 0.2);
    let high = ItemParameter::new(0.0, 1.6, 0.2);
    assert!(high.fisher_information(0.0) > low.fisher_information(0.0));
}

// ==================== Item Builder ====================

#[test]
fn test_build_multiple_choice_item() {
    let item = ItemBuilder::new("q1", "  What is 2 + 2?  ")
        .choice("3", false)
        .choice("4", true)
        .parameter(-0.5, 1.2, 0.25)
        .topic("arithmetic", "addition")
        .concept("addition")
        .build()
        .unwrap();

    assert_eq!(item.stem, "What is 2 + 2?");
    assert_eq!(item.format, ItemFormat::MultipleChoice);
    assert_eq!(item.correct_choice().unwrap().text, "4");
    assert!(item.is_correct_choice(1));
    assert!(!item.is_correct_choice(0));
    assert!(!item.is_correct_choice(7));
    assert_eq!(item.concept_ids, vec!["addition".to_string()]);
}

#[test]
fn test_build_rejects_blank_stem() {
    let err = ItemBuilder::new("q1", "   ")
        .format(ItemFormat::ShortAnswer)
        .build()
        .unwrap_err();
    assert!(matches!(err, CatError::InvalidItem { ref id, .. } if id == "q1"));
}

#[test]
fn test_build_rejects_single_choice_multiple_choice() {
    let err = ItemBuilder::new("q2", "Pick one")
        .choice("only", true)
        .build()
        .unwrap_err();
    assert!(matches!(err, CatError::InvalidItem { .. }));
}

#[test]
fn test_build_rejects_non_finite_parameters() {
    let err = ItemBuilder::new("q3", "Explain")
        .format(ItemFormat::MechanisticExplanation)
        .parameter(f64::NAN, 1.0, 0.0)
        .build()
        .unwrap_err();
    assert!(matches!(err, CatError::InvalidItem { .. }));

    let err = ItemBuilder::new("q4", "Explain")
        .format(ItemFormat::MechanisticExplanation)
        .parameter(0.0, 1.0, 1.5)
        .build()
        .unwrap_err();
    assert!(matches!(err, CatError::InvalidItem { .. }));
}

#[test]
fn test_free_response_item_needs_no_choices() {
    let item = ItemBuilder::new("q5", "Describe the mechanism")
        .format(ItemFormat::CaseScenario)
        .build()
        .unwrap();
    assert!(item.choices.is_empty());
    assert!(item.correct_choice().is_none());
}

#[test]
fn test_item_format_names_round_trip() {
    for format in [
        ItemFormat::MultipleChoice,
        ItemFormat::ShortAnswer,
        ItemFormat::CaseScenario,
        ItemFormat::MechanisticExplanation,
    ] {
        assert_eq!(ItemFormat::from_name(format.name()), Some(format));
    }
    assert_eq!(ItemFormat::from_name("essay"), None);
}
