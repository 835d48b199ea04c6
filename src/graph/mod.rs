//! In-memory graphs: domain/content knowledge graphs and per-learner mastery.

pub mod content;
pub mod domain;
pub mod knowledge_graph;
pub mod mastery_graph;
pub mod traversal;

pub use content::ContentGraph;
pub use domain::DomainGraph;
pub use knowledge_graph::{GraphNode, GraphSnapshot, KnowledgeGraph};
pub use mastery_graph::MasteryGraph;
pub use traversal::{
    bfs_traverse, find_any_cycle, find_cycle, has_cycle, learning_order, prerequisite_closure,
    Traversal, TraversalDirection,
};
