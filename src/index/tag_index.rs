//! Index by tag: maps each tag to sorted node IDs.

use std::collections::HashMap;

/// Maps each tag to a sorted list of node IDs carrying it.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    index: HashMap<String, Vec<String>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node IDs carrying `tag`.
    pub fn get(&self, tag: &str) -> &[String] {
        self.index.get(tag).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Node IDs carrying every tag in `tags`, sorted. Empty input matches nothing.
    pub fn get_all(&self, tags: &[&str]) -> Vec<String> {
        let Some((first, rest)) = tags.split_first() else {
            return Vec::new();
        };
        self.get(first)
            .iter()
            .filter(|id| rest.iter().all(|tag| self.contains(tag, id)))
            .cloned()
            .collect()
    }

    fn contains(&self, tag: &str, id: &str) -> bool {
        self.get(tag)
            .binary_search_by(|existing| existing.as_str().cmp(id))
            .is_ok()
    }

    pub fn add_node(&mut self, id: &str, tags: &[String]) {
        for tag in tags {
            let list = self.index.entry(tag.clone()).or_default();
            if let Err(pos) = list.binary_search_by(|existing| existing.as_str().cmp(id)) {
                list.insert(pos, id.to_string());
            }
        }
    }

    pub fn remove_node(&mut self, id: &str, tags: &[String]) {
        for tag in tags {
            if let Some(list) = self.index.get_mut(tag) {
                if let Ok(pos) = list.binary_search_by(|existing| existing.as_str().cmp(id)) {
                    list.remove(pos);
                }
                if list.is_empty() {
                    self.index.remove(tag);
                }
            }
        }
    }

    /// Number of distinct tags.
    pub fn tag_count(&self) -> usize {
        self.index.len()
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }
}
