//! Core graph structure: typed nodes + edges with adjacency indexes.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::index::{TagIndex, TypeIndex};
use crate::types::edge::clamp_weight;
use crate::types::{CatError, CatResult, ContentNode, DomainNode, Edge, EdgeType};

/// What the graph needs to know about a node.
pub trait GraphNode: Clone {
    /// Unique identifier.
    fn id(&self) -> &str;
    /// Display title.
    fn title(&self) -> &str;
    /// Kind name used by the type index.
    fn kind(&self) -> &'static str;
    /// Free-form labels used by the tag index.
    fn tags(&self) -> &[String];
}

impl GraphNode for DomainNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> &'static str {
        self.node_type.name()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl GraphNode for ContentNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> &'static str {
        self.content_type.name()
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Plain nodes + edges, the persisted form of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot<N> {
    pub nodes: Vec<N>,
    pub edges: Vec<Edge>,
}

impl<N> Default for GraphSnapshot<N> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }
}

/// Arena of typed nodes and edges.
///
/// Edges are owned by the graph and addressed by id; adjacency lists hold edge
/// ids only, so removing a node never leaves a dangling reference.
#[derive(Debug, Clone)]
pub struct KnowledgeGraph<N: GraphNode> {
    /// All nodes, indexed by ID.
    nodes: BTreeMap<String, N>,
    /// All edges, indexed by edge ID.
    edges: BTreeMap<u64, Edge>,
    /// source_id -> outgoing edge ids, in insertion order.
    outgoing: HashMap<String, Vec<u64>>,
    /// target_id -> incoming edge ids, in insertion order.
    incoming: HashMap<String, Vec<u64>>,
    /// Next available edge ID.
    next_edge_id: u64,
    type_index: TypeIndex,
    tag_index: TagIndex,
}

impl<N: GraphNode> Default for KnowledgeGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: GraphNode> KnowledgeGraph<N> {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            next_edge_id: 1,
            type_index: TypeIndex::new(),
            tag_index: TagIndex::new(),
        }
    }

    /// Create from pre-existing data (used by stores).
    ///
    /// Edge ids are reassigned; edges naming a missing node are rejected.
    pub fn from_parts(nodes: Vec<N>, edges: Vec<Edge>) -> CatResult<Self> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        for edge in edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }

    /// Copy out every node and edge.
    pub fn snapshot(&self) -> GraphSnapshot<N> {
        GraphSnapshot {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
        }
    }

    /// Rebuild a graph from a snapshot.
    pub fn from_snapshot(snapshot: GraphSnapshot<N>) -> CatResult<Self> {
        Self::from_parts(snapshot.nodes, snapshot.edges)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get a node by ID.
    pub fn get(&self, id: &str) -> Option<&N> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get an edge by ID.
    pub fn edge(&self, id: u64) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// All nodes, ordered by ID.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.values()
    }

    /// All edges, ordered by edge ID.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Insert a node, replacing any node with the same ID.
    ///
    /// Edges touching a replaced node are kept.
    pub fn add_node(&mut self, node: N) {
        let id = node.id().to_string();
        if let Some(old) = self.nodes.get(&id) {
            self.type_index.remove_node(&id, old.kind());
            self.tag_index.remove_node(&id, old.tags());
        }
        self.type_index.add_node(&id, node.kind());
        self.tag_index.add_node(&id, node.tags());
        self.nodes.insert(id, node);
    }

    /// Replace an existing node.
    pub fn update_node(&mut self, node: N) -> CatResult<()> {
        if !self.nodes.contains_key(node.id()) {
            return Err(CatError::NodeNotFound(node.id().to_string()));
        }
        self.add_node(node);
        Ok(())
    }

    /// Remove a node and all its edges.
    pub fn remove_node(&mut self, id: &str) -> CatResult<N> {
        let removed = self
            .nodes
            .remove(id)
            .ok_or_else(|| CatError::NodeNotFound(id.to_string()))?;

        self.type_index.remove_node(id, removed.kind());
        self.tag_index.remove_node(id, removed.tags());

        let mut touching: Vec<u64> = Vec::new();
        touching.extend(self.outgoing.remove(id).unwrap_or_default());
        touching.extend(self.incoming.remove(id).unwrap_or_default());
        touching.sort_unstable();
        touching.dedup();
        for edge_id in touching {
            self.detach_edge(edge_id);
        }

        Ok(removed)
    }

    /// Add an edge between two existing nodes. Returns the assigned edge ID.
    pub fn add_edge(&mut self, mut edge: Edge) -> CatResult<u64> {
        if !self.nodes.contains_key(&edge.source_id) {
            log::warn!("edge rejected: unknown source {}", edge.source_id);
            return Err(CatError::NodeNotFound(edge.source_id));
        }
        if !self.nodes.contains_key(&edge.target_id) {
            log::warn!("edge rejected: unknown target {}", edge.target_id);
            return Err(CatError::InvalidEdgeTarget(edge.target_id));
        }

        let id = self.next_edge_id;
        self.next_edge_id += 1;
        edge.id = id;
        edge.weight = clamp_weight(edge.weight);

        self.outgoing
            .entry(edge.source_id.clone())
            .or_default()
            .push(id);
        self.incoming
            .entry(edge.target_id.clone())
            .or_default()
            .push(id);
        self.edges.insert(id, edge);

        Ok(id)
    }

    /// Shorthand for a full-strength edge.
    pub fn link(&mut self, source_id: &str, target_id: &str, edge_type: EdgeType) -> CatResult<u64> {
        self.add_edge(Edge::link(source_id, target_id, edge_type))
    }

    /// Remove a specific edge.
    pub fn remove_edge(&mut self, id: u64) -> CatResult<Edge> {
        self.detach_edge(id).ok_or(CatError::EdgeNotFound(id))
    }

    fn detach_edge(&mut self, id: u64) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        if let Some(list) = self.outgoing.get_mut(&edge.source_id) {
            list.retain(|e| *e != id);
        }
        if let Some(list) = self.incoming.get_mut(&edge.target_id) {
            list.retain(|e| *e != id);
        }
        Some(edge)
    }

    /// Get all edges from a source node, in insertion order.
    pub fn edges_from(&self, source_id: &str) -> Vec<&Edge> {
        self.resolve(self.outgoing.get(source_id))
    }

    /// Get all edges that point TO this node, in insertion order.
    pub fn edges_to(&self, target_id: &str) -> Vec<&Edge> {
        self.resolve(self.incoming.get(target_id))
    }

    fn resolve(&self, ids: Option<&Vec<u64>>) -> Vec<&Edge> {
        ids.map(|ids| ids.iter().filter_map(|id| self.edges.get(id)).collect())
            .unwrap_or_default()
    }

    /// Targets of outgoing edges of one type, deduplicated, first-seen order.
    pub fn targets_of(&self, source_id: &str, edge_type: EdgeType) -> Vec<&N> {
        let ids = self
            .edges_from(source_id)
            .into_iter()
            .filter(|e| e.edge_type == edge_type)
            .map(|e| e.target_id.as_str());
        self.collect_unique(ids)
    }

    /// Sources of incoming edges of one type, deduplicated, first-seen order.
    pub fn sources_of(&self, target_id: &str, edge_type: EdgeType) -> Vec<&N> {
        let ids = self
            .edges_to(target_id)
            .into_iter()
            .filter(|e| e.edge_type == edge_type)
            .map(|e| e.source_id.as_str());
        self.collect_unique(ids)
    }

    pub(crate) fn collect_unique<'a>(&'a self, ids: impl Iterator<Item = &'a str>) -> Vec<&'a N> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(id) {
                out.push(node);
            }
        }
        out
    }

    /// Nodes of the given kind name, ordered by ID.
    pub fn nodes_by_kind(&self, kind: &str) -> Vec<&N> {
        self.type_index
            .get(kind)
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Nodes carrying every tag in `tags`, ordered by ID.
    pub fn nodes_with_tags(&self, tags: &[&str]) -> Vec<&N> {
        self.tag_index
            .get_all(tags)
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Count of edges per edge type.
    pub fn edge_type_histogram(&self) -> BTreeMap<EdgeType, usize> {
        let mut histogram = BTreeMap::new();
        for edge in self.edges.values() {
            *histogram.entry(edge.edge_type).or_insert(0) += 1;
        }
        histogram
    }

    /// Get the type index.
    pub fn type_index(&self) -> &TypeIndex {
        &self.type_index
    }

    /// Get the tag index.
    pub fn tag_index(&self) -> &TagIndex {
        &self.tag_index
    }
}

