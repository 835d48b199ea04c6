//! Three-parameter logistic item model.
//!
//! P(theta) = c + (1 - c) * sigmoid(a * (theta - b))
//!
//! - a: discrimination
//! - b: difficulty
//! - c: guessing (lower asymptote)

use crate::types::ItemParameter;

/// Logistic exponent cap; keeps `exp` finite and P strictly below 1.
const MAX_EXPONENT: f64 = 35.0;

/// Probability clamp used by the information formula.
const MIN_PROBABILITY: f64 = 1e-9;

/// Largest f64 below 1.0.
const MAX_PROBABILITY: f64 = 1.0 - f64::EPSILON / 2.0;

/// Numerically safe logistic function.
pub fn sigmoid(x: f64) -> f64 {
    let capped = x.clamp(-MAX_EXPONENT, MAX_EXPONENT);
    1.0 / (1.0 + (-capped).exp())
}

/// Probability of a correct response at ability `theta`. Always in `[c, 1)`.
pub fn probability_correct(param: &ItemParameter, theta: f64) -> f64 {
    let logistic = sigmoid(param.discrimination * (theta - param.difficulty));
    // A high guessing floor can round the sum up to exactly 1.0.
    (param.guessing + (1.0 - param.guessing) * logistic).min(MAX_PROBABILITY)
}

/// Fisher information of an item at ability `theta`.
///
/// Formula: a^2 * (q / p) * ((p - c) / (1 - c))^2
///
/// Exactly 0.0 when `c >= 1`: a pure-guess item cannot discriminate.
pub fn fisher_information(param: &ItemParameter, theta: f64) -> f64 {
    let one_minus_guessing = 1.0 - param.guessing;
    if one_minus_guessing <= 0.0 {
        return 0.0;
    }

    let p = probability_correct(param, theta).clamp(MIN_PROBABILITY, 1.0 - MIN_PROBABILITY);
    let q = 1.0 - p;
    let normalized = (p - param.guessing) / one_minus_guessing;
    param.discrimination * param.discrimination * (q / p) * normalized * normalized
}
