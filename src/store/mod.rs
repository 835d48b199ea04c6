//! Persistence contracts and their implementations.
//!
//! The engine never touches storage directly. Callers load inputs through
//! these traits and hand plain values to the engine.

pub mod json;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::InMemoryStore;

use crate::graph::{ContentGraph, DomainGraph, MasteryGraph};
use crate::types::{CatResult, Item};

/// Supplies items for adaptive sessions.
pub trait ItemSource {
    /// Items for `topic`, or every item when `topic` is `None`.
    fn get_items(&self, topic: Option<&str>) -> CatResult<Vec<Item>>;
}

/// Loads and saves the domain graph.
pub trait DomainGraphStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load_domain_graph(&self) -> CatResult<Option<DomainGraph>>;
    fn save_domain_graph(&mut self, graph: &DomainGraph) -> CatResult<()>;
}

/// Loads and saves content graphs, optionally one per topic.
pub trait ContentGraphStore {
    fn load_content_graph(&self, topic: Option<&str>) -> CatResult<Option<ContentGraph>>;
    fn save_content_graph(&mut self, topic: Option<&str>, graph: &ContentGraph) -> CatResult<()>;
}

/// Loads and saves per-learner mastery.
pub trait MasteryStore {
    fn load_for_learner(&self, learner_id: &str) -> CatResult<Option<MasteryGraph>>;
    fn save_mastery(&mut self, graph: &MasteryGraph) -> CatResult<()>;
}

/// Stored mastery for `learner_id`, or a fresh graph seeded with every concept
/// in `domain` as `Unknown`.
pub fn load_or_init_mastery<S: MasteryStore + ?Sized>(
    store: &S,
    learner_id: &str,
    domain: Option<&DomainGraph>,
) -> CatResult<MasteryGraph> {
    if let Some(graph) = store.load_for_learner(learner_id)? {
        return Ok(graph);
    }
    let mut graph = MasteryGraph::new(learner_id);
    if let Some(domain) = domain {
        graph.ensure_concepts(domain.concepts().into_iter().map(|n| n.id.clone()));
    }
    log::debug!(
        "initialised mastery for {} with {} concept(s)",
        learner_id,
        graph.len()
    );
    Ok(graph)
}

/// Keep items whose topic matches, case-insensitively.
pub(crate) fn filter_by_topic(items: Vec<Item>, topic: Option<&str>) -> Vec<Item> {
    match topic {
        Some(topic) => items
            .into_iter()
            .filter(|item| item.topic.eq_ignore_ascii_case(topic))
            .collect(),
        None => items,
    }
}
