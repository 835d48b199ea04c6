//! Error types for the cat-mastery library.

use thiserror::Error;

/// All errors that can occur in the cat-mastery library.
#[derive(Error, Debug)]
pub enum CatError {
    /// A response was recorded while no item was active.
    #[error("Cannot record a response without an active item")]
    NoActiveItem,

    /// Node not found by ID.
    #[error("Node {0} not found")]
    NodeNotFound(String),

    /// Edge references a target node that does not exist.
    #[error("Edge references invalid target node: {0}")]
    InvalidEdgeTarget(String),

    /// Edge not found by ID.
    #[error("Edge {0} not found")]
    EdgeNotFound(u64),

    /// Item failed validation when built.
    #[error("Invalid item {id}: {reason}")]
    InvalidItem { id: String, reason: String },

    /// Learner profile is missing an id or name.
    #[error("Invalid learner: {0}")]
    InvalidLearner(String),

    /// Termination criteria cannot be satisfied or are malformed.
    #[error("Invalid termination criteria: {0}")]
    InvalidCriteria(String),

    /// Decay window must be a positive, finite number of days.
    #[error("Decay window must be positive and finite, got {0}")]
    InvalidDecayWindow(f64),

    /// A stored mastery document belongs to a different learner.
    #[error("Mastery stored for learner {stored} was requested as {requested}")]
    LearnerMismatch { requested: String, stored: String },

    /// A depends-on cycle prevents ordering.
    #[error("Dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),
}

/// Convenience result type for cat-mastery operations.
pub type CatResult<T> = Result<T, CatError>;
