//! In-memory store, for tests and embedding.

use std::collections::HashMap;

use crate::graph::{ContentGraph, DomainGraph, MasteryGraph};
use crate::types::{CatResult, Item};

use super::{
    filter_by_topic, ContentGraphStore, DomainGraphStore, ItemSource, MasteryStore,
};

/// Holds everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    items: Vec<Item>,
    domain: Option<DomainGraph>,
    content: HashMap<Option<String>, ContentGraph>,
    mastery: HashMap<String, MasteryGraph>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store serving the given items.
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }
}

impl ItemSource for InMemoryStore {
    fn get_items(&self, topic: Option<&str>) -> CatResult<Vec<Item>> {
        Ok(filter_by_topic(self.items.clone(), topic))
    }
}

impl DomainGraphStore for InMemoryStore {
    fn load_domain_graph(&self) -> CatResult<Option<DomainGraph>> {
        Ok(self.domain.clone())
    }

    fn save_domain_graph(&mut self, graph: &DomainGraph) -> CatResult<()> {
        self.domain = Some(graph.clone());
        Ok(())
    }
}

impl ContentGraphStore for InMemoryStore {
    fn load_content_graph(&self, topic: Option<&str>) -> CatResult<Option<ContentGraph>> {
        Ok(self.content.get(&topic.map(str::to_string)).cloned())
    }

    fn save_content_graph(&mut self, topic: Option<&str>, graph: &ContentGraph) -> CatResult<()> {
        self.content.insert(topic.map(str::to_string), graph.clone());
        Ok(())
    }
}

impl MasteryStore for InMemoryStore {
    fn load_for_learner(&self, learner_id: &str) -> CatResult<Option<MasteryGraph>> {
        Ok(self.mastery.get(learner_id).cloned())
    }

    fn save_mastery(&mut self, graph: &MasteryGraph) -> CatResult<()> {
        self.mastery
            .insert(graph.learner_id().to_string(), graph.clone());
        Ok(())
    }
}
