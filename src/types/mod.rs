//! All data types for the cat-mastery library.

pub mod ability;
pub mod edge;
pub mod error;
pub mod evidence;
pub mod item;
pub mod mastery;
pub mod node;

pub use ability::{AbilityEstimate, EstimationMethod, LearnerProfile, THETA_MAX, THETA_MIN};
pub use edge::{Edge, EdgeType};
pub use error::{CatError, CatResult};
pub use evidence::EvidenceRecord;
pub use item::{Item, ItemBuilder, ItemChoice, ItemFormat, ItemParameter};
pub use mastery::{ConceptMastery, EvidenceCounts, MasteryState};
pub use node::{
    BloomLevel, ContentNode, ContentNodeType, ContentOrigin, DomainNode, DomainNodeType, Modality,
};

/// Microseconds in one day.
pub const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// Returns the current time as Unix epoch microseconds.
pub fn now_micros() -> u64 {
    chrono::Utc::now().timestamp_micros() as u64
}

/// Whole and fractional days between two timestamps (0 if `later` is earlier).
pub fn days_between(earlier: u64, later: u64) -> f64 {
    later.saturating_sub(earlier) as f64 / MICROS_PER_DAY
}
