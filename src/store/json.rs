//! Directory of JSON documents.
//!
//! Layout:
//! - `items.json`: array of items
//! - `domain-graph.json`: domain graph snapshot
//! - `content-graph.json` / `content-graph-{topic}.json`: content graph snapshots
//! - `mastery-{learner}.json`: one mastery graph per learner
//!
//! Topic and learner ids are hex-encoded in file names, so ids differing only
//! in case or punctuation never share a file.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::graph::{ContentGraph, DomainGraph, GraphSnapshot, KnowledgeGraph, MasteryGraph};
use crate::types::{CatError, CatResult, ContentNode, DomainNode, Item};

use super::{
    filter_by_topic, ContentGraphStore, DomainGraphStore, ItemSource, MasteryStore,
};

const ITEMS_FILE: &str = "items.json";
const DOMAIN_FILE: &str = "domain-graph.json";

/// JSON-file backed store rooted at one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Replace the stored item bank.
    pub fn save_items(&mut self, items: &[Item]) -> CatResult<()> {
        self.write_json(&self.root.join(ITEMS_FILE), &items)
    }

    fn content_path(&self, topic: Option<&str>) -> PathBuf {
        match topic {
            Some(topic) => self
                .root
                .join(format!("content-graph-{}.json", file_component(topic))),
            None => self.root.join("content-graph.json"),
        }
    }

    fn mastery_path(&self, learner_id: &str) -> PathBuf {
        self.root
            .join(format!("mastery-{}.json", file_component(learner_id)))
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> CatResult<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Write via a temp file and rename so readers never see a partial document.
    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> CatResult<()> {
        std::fs::create_dir_all(&self.root)?;
        let tmp = path.with_extension("json.tmp");
        let payload = serde_json::to_vec_pretty(value)?;
        std::fs::write(&tmp, payload)?;
        std::fs::rename(&tmp, path)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}

/// Encode an identifier for use in a file name, losslessly.
fn file_component(raw: &str) -> String {
    hex::encode(raw.as_bytes())
}

impl ItemSource for JsonFileStore {
    fn get_items(&self, topic: Option<&str>) -> CatResult<Vec<Item>> {
        let items: Vec<Item> = self
            .read_json(&self.root.join(ITEMS_FILE))?
            .unwrap_or_default();
        for item in &items {
            item.validate()?;
        }
        Ok(filter_by_topic(items, topic))
    }
}

impl DomainGraphStore for JsonFileStore {
    fn load_domain_graph(&self) -> CatResult<Option<DomainGraph>> {
        let snapshot: Option<GraphSnapshot<DomainNode>> =
            self.read_json(&self.root.join(DOMAIN_FILE))?;
        snapshot.map(KnowledgeGraph::from_snapshot).transpose()
    }

    fn save_domain_graph(&mut self, graph: &DomainGraph) -> CatResult<()> {
        self.write_json(&self.root.join(DOMAIN_FILE), &graph.snapshot())
    }
}

impl ContentGraphStore for JsonFileStore {
    fn load_content_graph(&self, topic: Option<&str>) -> CatResult<Option<ContentGraph>> {
        let snapshot: Option<GraphSnapshot<ContentNode>> =
            self.read_json(&self.content_path(topic))?;
        snapshot.map(KnowledgeGraph::from_snapshot).transpose()
    }

    fn save_content_graph(&mut self, topic: Option<&str>, graph: &ContentGraph) -> CatResult<()> {
        self.write_json(&self.content_path(topic), &graph.snapshot())
    }
}

impl MasteryStore for JsonFileStore {
    fn load_for_learner(&self, learner_id: &str) -> CatResult<Option<MasteryGraph>> {
        let graph: Option<MasteryGraph> = self.read_json(&self.mastery_path(learner_id))?;
        match graph {
            Some(graph) if graph.learner_id() != learner_id => Err(CatError::LearnerMismatch {
                requested: learner_id.to_string(),
                stored: graph.learner_id().to_string(),
            }),
            other => Ok(other),
        }
    }

    fn save_mastery(&mut self, graph: &MasteryGraph) -> CatResult<()> {
        self.write_json(&self.mastery_path(graph.learner_id()), graph)
    }
}
