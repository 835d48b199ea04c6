//! Content graph: instructional material and the domain nodes it addresses.

use crate::types::{ContentNode, ContentNodeType, EdgeType, Modality};

use super::KnowledgeGraph;

/// Graph of instructional material.
pub type ContentGraph = KnowledgeGraph<ContentNode>;

impl KnowledgeGraph<ContentNode> {
    /// Explanation nodes with an `explains` edge into `concept_id`.
    pub fn explanations_for(&self, concept_id: &str) -> Vec<&ContentNode> {
        self.material_for(concept_id, EdgeType::Explains, ContentNodeType::Explanation)
    }

    /// Example nodes with an `is_example_of` edge into `concept_id`.
    pub fn examples_for(&self, concept_id: &str) -> Vec<&ContentNode> {
        self.material_for(concept_id, EdgeType::IsExampleOf, ContentNodeType::Example)
    }

    /// Sources of incoming `edge_type` edges whose content type matches.
    pub fn material_for(
        &self,
        concept_id: &str,
        edge_type: EdgeType,
        content_type: ContentNodeType,
    ) -> Vec<&ContentNode> {
        self.sources_of(concept_id, edge_type)
            .into_iter()
            .filter(|n| n.content_type == content_type)
            .collect()
    }

    pub fn by_type(&self, content_type: ContentNodeType) -> Vec<&ContentNode> {
        self.nodes_by_kind(content_type.name())
    }

    pub fn by_modality(&self, modality: Modality) -> Vec<&ContentNode> {
        self.nodes().filter(|n| n.modality == modality).collect()
    }

    /// Nodes whose quality score is at least `min_quality`.
    pub fn with_min_quality(&self, min_quality: f64) -> Vec<&ContentNode> {
        self.nodes()
            .filter(|n| n.quality_score >= min_quality)
            .collect()
    }

    /// Nodes addressing any of the given domain nodes.
    pub fn linked_to(&self, domain_node_ids: &[&str]) -> Vec<&ContentNode> {
        self.nodes()
            .filter(|n| {
                n.domain_node_ids
                    .iter()
                    .any(|d| domain_node_ids.contains(&d.as_str()))
            })
            .collect()
    }
}
