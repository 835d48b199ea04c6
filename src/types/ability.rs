//! Ability estimates and learner profiles.

use serde::{Deserialize, Serialize};

use super::now_micros;
use crate::types::error::{CatError, CatResult};

/// Lowest ability the session update can produce.
pub const THETA_MIN: f64 = -3.0;

/// Highest ability the session update can produce.
pub const THETA_MAX: f64 = 3.0;

/// How an ability estimate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    /// Starting value before any response.
    Prior,
    /// One Newton-like step after a scored response.
    NewtonStep,
}

impl EstimationMethod {
    /// Return a human-readable name for this method.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Prior => "prior",
            Self::NewtonStep => "newton_step",
        }
    }
}

/// A learner's proficiency on the latent ability scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityEstimate {
    /// Ability value.
    pub theta: f64,
    /// Standard error of `theta` (non-negative).
    pub standard_error: f64,
    /// How this value was produced.
    pub method: EstimationMethod,
    /// When this estimate was made (Unix epoch microseconds).
    pub timestamp: u64,
}

impl AbilityEstimate {
    /// Create an estimate, forcing the standard error non-negative.
    pub fn new(theta: f64, standard_error: f64, method: EstimationMethod, timestamp: u64) -> Self {
        Self {
            theta,
            standard_error: standard_error.abs(),
            method,
            timestamp,
        }
    }

    /// A prior estimate stamped with the current time.
    pub fn prior(theta: f64, standard_error: f64) -> Self {
        Self::new(theta, standard_error, EstimationMethod::Prior, now_micros())
    }

    /// Squared standard error.
    pub fn variance(&self) -> f64 {
        self.standard_error * self.standard_error
    }

    /// Test information implied by the standard error (0 when unknown).
    pub fn information(&self) -> f64 {
        let variance = self.variance();
        if variance <= 0.0 {
            0.0
        } else {
            1.0 / variance
        }
    }
}

impl Default for AbilityEstimate {
    /// Neutral prior: theta 0, standard error 1.
    fn default() -> Self {
        Self::prior(0.0, 1.0)
    }
}

/// The learner a session or mastery graph belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Learning goals in the learner's own words.
    #[serde(default)]
    pub objectives: Vec<String>,
}

impl LearnerProfile {
    /// Create a profile. Id and name are required; blank objectives are dropped.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        objectives: impl IntoIterator<Item = String>,
    ) -> CatResult<Self> {
        let id = id.into().trim().to_string();
        let name = name.into().trim().to_string();
        if id.is_empty() {
            return Err(CatError::InvalidLearner("id is required".to_string()));
        }
        if name.is_empty() {
            return Err(CatError::InvalidLearner("name is required".to_string()));
        }
        let objectives = objectives
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        Ok(Self {
            id,
            name,
            objectives,
        })
    }
}
