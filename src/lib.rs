//! cat-mastery: adaptive testing and evidence-based mastery tracking.
//!
//! Runs computerized adaptive tests under a three-parameter logistic item
//! model, feeds the scored responses into a per-learner mastery graph, and
//! answers prerequisite and cycle queries over typed domain/content graphs.

pub mod cli;
pub mod config;
pub mod engine;
pub mod graph;
pub mod index;
pub mod store;
pub mod types;

// Re-export commonly used types at the crate root
pub use config::{load_config, resolve_data_dir, EngineConfig};
pub use engine::{
    remediation_targets, AdaptiveSession, DecayReport, GraphSummary, ItemResponse,
    RemediationTarget, SessionProgress, SessionReport, StateChange, TerminationCriteria,
    TerminationReason,
};
pub use graph::{
    ContentGraph, DomainGraph, GraphNode, GraphSnapshot, KnowledgeGraph, MasteryGraph,
    TraversalDirection,
};
pub use index::{TagIndex, TypeIndex};
pub use store::{
    ContentGraphStore, DomainGraphStore, InMemoryStore, ItemSource, JsonFileStore, MasteryStore,
};
pub use types::{
    now_micros, AbilityEstimate, BloomLevel, CatError, CatResult, ConceptMastery, ContentNode,
    ContentNodeType, ContentOrigin, DomainNode, DomainNodeType, Edge, EdgeType, EvidenceRecord,
    Item, ItemBuilder, ItemChoice, ItemFormat, ItemParameter, LearnerProfile, MasteryState,
    Modality,
};
