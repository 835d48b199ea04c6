//! Domain graph: concepts, skills and objectives linked by prerequisite edges.

use crate::types::{BloomLevel, DomainNode, DomainNodeType, EdgeType};

use super::KnowledgeGraph;

/// Graph of teachable units.
pub type DomainGraph = KnowledgeGraph<DomainNode>;

impl KnowledgeGraph<DomainNode> {
    /// Direct prerequisites of `id` (targets of its `depends_on` edges).
    pub fn prerequisites(&self, id: &str) -> Vec<&DomainNode> {
        self.targets_of(id, EdgeType::DependsOn)
    }

    /// Units that directly depend on `id`.
    pub fn dependents(&self, id: &str) -> Vec<&DomainNode> {
        self.sources_of(id, EdgeType::DependsOn)
    }

    /// Units linked to `id` by `related_to` in either direction.
    pub fn related(&self, id: &str) -> Vec<&DomainNode> {
        let outgoing = self
            .edges_from(id)
            .into_iter()
            .filter(|e| e.edge_type == EdgeType::RelatedTo)
            .map(|e| e.target_id.as_str());
        let incoming = self
            .edges_to(id)
            .into_iter()
            .filter(|e| e.edge_type == EdgeType::RelatedTo)
            .map(|e| e.source_id.as_str());
        self.collect_unique(outgoing.chain(incoming).filter(|other| *other != id))
    }

    /// Nodes of one domain type.
    pub fn by_type(&self, node_type: DomainNodeType) -> Vec<&DomainNode> {
        self.nodes_by_kind(node_type.name())
    }

    /// Concept nodes, ordered by id.
    pub fn concepts(&self) -> Vec<&DomainNode> {
        self.by_type(DomainNodeType::Concept)
    }

    pub fn by_bloom(&self, level: BloomLevel) -> Vec<&DomainNode> {
        self.nodes().filter(|n| n.bloom_level == level).collect()
    }
}
