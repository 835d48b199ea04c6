//! Edge types and the core edge struct.

use serde::{Deserialize, Serialize};

use super::now_micros;

/// The type of relationship between two graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// The source requires the target first (target is a prerequisite of source).
    DependsOn,
    /// The source belongs to a larger topic or objective.
    PartOf,
    /// Related without ordering.
    RelatedTo,
    /// The source is commonly confused with the target.
    ContrastsWith,
    /// Instructional material that explains the target.
    Explains,
    /// Worked example of the target.
    IsExampleOf,
    /// Adds depth to the target without being required.
    Elaborates,
}

impl EdgeType {
    /// All edge types, in declaration order.
    pub const ALL: [EdgeType; 7] = [
        Self::DependsOn,
        Self::PartOf,
        Self::RelatedTo,
        Self::ContrastsWith,
        Self::Explains,
        Self::IsExampleOf,
        Self::Elaborates,
    ];

    /// Return a human-readable name for this edge type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DependsOn => "depends_on",
            Self::PartOf => "part_of",
            Self::RelatedTo => "related_to",
            Self::ContrastsWith => "contrasts_with",
            Self::Explains => "explains",
            Self::IsExampleOf => "is_example_of",
            Self::Elaborates => "elaborates",
        }
    }

    /// Parse an edge type from a string name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "depends_on" | "dependson" | "requires" => Some(Self::DependsOn),
            "part_of" | "partof" => Some(Self::PartOf),
            "related_to" | "relatedto" => Some(Self::RelatedTo),
            "contrasts_with" | "contrastswith" => Some(Self::ContrastsWith),
            "explains" => Some(Self::Explains),
            "is_example_of" | "isexampleof" | "example_of" => Some(Self::IsExampleOf),
            "elaborates" => Some(Self::Elaborates),
            _ => None,
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A directed, typed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Identifier assigned by the graph on insertion (0 until then).
    #[serde(default)]
    pub id: u64,
    /// Source node ID (origin of the relationship).
    pub source_id: String,
    /// Target node ID (destination of the relationship).
    pub target_id: String,
    /// Type of relationship.
    pub edge_type: EdgeType,
    /// Strength of relationship (0.0 = weak, 1.0 = strong).
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// When this edge was created (Unix epoch microseconds).
    #[serde(default)]
    pub created_at: u64,
}

fn default_weight() -> f32 {
    1.0
}

/// Weight in [0.0, 1.0]; NaN becomes 0.0.
pub(crate) fn clamp_weight(weight: f32) -> f32 {
    if weight.is_nan() {
        0.0
    } else {
        weight.clamp(0.0, 1.0)
    }
}

impl Edge {
    /// Create a new edge with weight clamped to [0.0, 1.0].
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        edge_type: EdgeType,
        weight: f32,
    ) -> Self {
        Self::with_timestamp(source_id, target_id, edge_type, weight, now_micros())
    }

    /// Create a full-strength edge.
    pub fn link(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        edge_type: EdgeType,
    ) -> Self {
        Self::new(source_id, target_id, edge_type, 1.0)
    }

    /// Create a new edge with an explicit timestamp.
    pub fn with_timestamp(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        edge_type: EdgeType,
        weight: f32,
        created_at: u64,
    ) -> Self {
        Self {
            id: 0,
            source_id: source_id.into(),
            target_id: target_id.into(),
            edge_type,
            weight: clamp_weight(weight),
            created_at,
        }
    }

    /// Whether this edge touches the given node on either end.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }
}
