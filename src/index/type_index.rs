//! Index by node kind: maps each kind name to sorted node IDs.

use std::collections::HashMap;

/// Maps each node kind (e.g. `concept`, `explanation`) to a sorted list of node IDs.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    index: HashMap<&'static str, Vec<String>>,
}

impl TypeIndex {
    /// Create a new, empty type index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all node IDs of a given kind.
    pub fn get(&self, kind: &str) -> &[String] {
        self.index.get(kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Get all node IDs matching any of the given kinds, merged and sorted.
    pub fn get_any(&self, kinds: &[&str]) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        for kind in kinds {
            if let Some(ids) = self.index.get(*kind) {
                result.extend_from_slice(ids);
            }
        }
        result.sort_unstable();
        result.dedup();
        result
    }

    /// Count nodes of a given kind.
    pub fn count(&self, kind: &str) -> usize {
        self.index.get(kind).map(|v| v.len()).unwrap_or(0)
    }

    /// Incrementally add a node.
    pub fn add_node(&mut self, id: &str, kind: &'static str) {
        let list = self.index.entry(kind).or_default();
        if let Err(pos) = list.binary_search_by(|existing| existing.as_str().cmp(id)) {
            list.insert(pos, id.to_string());
        }
    }

    /// Remove a node from the index.
    pub fn remove_node(&mut self, id: &str, kind: &str) {
        if let Some(list) = self.index.get_mut(kind) {
            if let Ok(pos) = list.binary_search_by(|existing| existing.as_str().cmp(id)) {
                list.remove(pos);
            }
        }
    }

    /// Clear the index.
    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Number of total entries across all kinds.
    pub fn len(&self) -> usize {
        self.index.values().map(|v| v.len()).sum()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-kind counts, skipping kinds with no nodes left.
    pub fn histogram(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = self
            .index
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(kind, ids)| (*kind, ids.len()))
            .collect();
        counts.sort_unstable();
        counts
    }
}
