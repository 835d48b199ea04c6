//! Predictive ability plot: where theta is expected to be after more practice.

use serde::{Deserialize, Serialize};

use crate::engine::session::INFORMATION_FLOOR;
use crate::types::{AbilityEstimate, Item, ItemParameter, THETA_MAX, THETA_MIN};

/// Bounds on the per-item success probability used for projection.
pub const MIN_FORECAST_PROBABILITY: f64 = 0.15;
pub const MAX_FORECAST_PROBABILITY: f64 = 0.9;

/// Expected theta gain per item, scaled by the success probability.
pub const LEARNING_GAIN: f64 = 0.05;

/// Two-sided 95% normal quantile.
const Z_95: f64 = 1.96;

/// Projected ability after `step` more items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub step: usize,
    pub expected_theta: f64,
    pub lower_theta: f64,
    pub upper_theta: f64,
}

/// Ability projection over a fixed number of future items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictivePlot {
    pub horizon: usize,
    pub baseline_theta: f64,
    pub baseline_standard_error: f64,
    /// Mean chance of a correct answer on the candidate items, bounded.
    pub prob_correct: f64,
    pub points: Vec<ForecastPoint>,
}

/// Project `ability` over `horizon` items drawn from `items`.
///
/// Theta drifts up by `LEARNING_GAIN * p` per item. The band is a 95%
/// interval whose width shrinks as item information accumulates. With no
/// candidate items a default item is assumed. Every bound stays in
/// `[THETA_MIN, THETA_MAX]`.
pub fn predictive_plot(ability: &AbilityEstimate, items: &[Item], horizon: usize) -> PredictivePlot {
    let theta = ability.theta;
    let default_parameter = [ItemParameter::default()];
    let parameters: Vec<&ItemParameter> = if items.is_empty() {
        default_parameter.iter().collect()
    } else {
        items.iter().map(|item| &item.parameter).collect()
    };
    let count = parameters.len() as f64;

    let mean_probability =
        parameters.iter().map(|p| p.probability_correct(theta)).sum::<f64>() / count;
    let prob_correct = mean_probability.clamp(MIN_FORECAST_PROBABILITY, MAX_FORECAST_PROBABILITY);
    let mean_information = (parameters
        .iter()
        .map(|p| p.fisher_information(theta))
        .sum::<f64>()
        / count)
        .max(INFORMATION_FLOOR);

    let points = (1..=horizon)
        .map(|step| {
            let expected_theta =
                (theta + step as f64 * LEARNING_GAIN * prob_correct).clamp(THETA_MIN, THETA_MAX);
            let precision = ability.information() + step as f64 * mean_information;
            let standard_error = 1.0 / precision.sqrt();
            ForecastPoint {
                step,
                expected_theta,
                lower_theta: (expected_theta - Z_95 * standard_error).max(THETA_MIN),
                upper_theta: (expected_theta + Z_95 * standard_error).min(THETA_MAX),
            }
        })
        .collect();

    PredictivePlot {
        horizon,
        baseline_theta: theta,
        baseline_standard_error: ability.standard_error,
        prob_correct,
        points,
    }
}
