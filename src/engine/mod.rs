//! Adaptive sessions and the mastery rules they feed.

pub mod decay;
pub mod forecast;
pub mod irt;
pub mod remediation;
pub mod review;
pub mod session;
pub mod summary;
pub mod transition;

pub use decay::DecayReport;
pub use forecast::{predictive_plot, ForecastPoint, PredictivePlot};
pub use remediation::{remediation_targets, RemediationTarget};
pub use review::with_due_reviews;
pub use session::{
    AdaptiveSession, ItemResponse, SessionProgress, SessionReport, TerminationCriteria,
    TerminationReason,
};
pub use summary::{GraphSummary, RecentConcept};
pub use transition::StateChange;
