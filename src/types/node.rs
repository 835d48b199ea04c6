//! Domain and content node types.

use serde::{Deserialize, Serialize};

/// Bloom's taxonomy level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BloomLevel {
    Remember,
    Understand,
    #[default]
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl BloomLevel {
    /// Return a human-readable name for this level.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Remember => "remember",
            Self::Understand => "understand",
            Self::Apply => "apply",
            Self::Analyze => "analyze",
            Self::Evaluate => "evaluate",
            Self::Create => "create",
        }
    }

    /// Parse a level from a string name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "remember" => Some(Self::Remember),
            "understand" => Some(Self::Understand),
            "apply" => Some(Self::Apply),
            "analyze" | "analyse" => Some(Self::Analyze),
            "evaluate" => Some(Self::Evaluate),
            "create" => Some(Self::Create),
            _ => None,
        }
    }
}

impl std::fmt::Display for BloomLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind of teachable unit in the domain graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainNodeType {
    Concept,
    Skill,
    Objective,
    Topic,
    Subtopic,
}

impl DomainNodeType {
    /// Return a human-readable name for this node type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Skill => "skill",
            Self::Objective => "objective",
            Self::Topic => "topic",
            Self::Subtopic => "subtopic",
        }
    }

    /// Parse a node type from a string name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "concept" => Some(Self::Concept),
            "skill" => Some(Self::Skill),
            "objective" => Some(Self::Objective),
            "topic" => Some(Self::Topic),
            "subtopic" => Some(Self::Subtopic),
            _ => None,
        }
    }
}

impl std::fmt::Display for DomainNodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A concept, skill or objective in the domain graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainNode {
    /// Unique identifier.
    pub id: String,
    /// Short display title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Kind of unit.
    pub node_type: DomainNodeType,
    /// Cognitive level.
    #[serde(default)]
    pub bloom_level: BloomLevel,
    /// Difficulty on the ability scale.
    #[serde(default)]
    pub difficulty: f64,
    /// How heavily this unit weighs on the exam (0.0 - 1.0).
    #[serde(default = "default_weight")]
    pub exam_relevance_weight: f64,
    /// Free-form labels.
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_weight() -> f64 {
    1.0
}

impl DomainNode {
    /// Create a node with default difficulty, Bloom level and weight.
    pub fn new(id: impl Into<String>, title: impl Into<String>, node_type: DomainNodeType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            node_type,
            bloom_level: BloomLevel::default(),
            difficulty: 0.0,
            exam_relevance_weight: default_weight(),
            tags: Vec::new(),
        }
    }

    /// Shorthand for a concept node whose title equals its id.
    pub fn concept(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, DomainNodeType::Concept)
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the Bloom level.
    pub fn with_bloom_level(mut self, level: BloomLevel) -> Self {
        self.bloom_level = level;
        self
    }

    /// Set the difficulty.
    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the exam relevance weight (clamped to [0.0, 1.0]).
    pub fn with_exam_relevance(mut self, weight: f64) -> Self {
        self.exam_relevance_weight = weight.clamp(0.0, 1.0);
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// Kind of instructional material in the content graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentNodeType {
    /// Anchor mirroring a domain concept inside the content graph.
    Concept,
    Explanation,
    Example,
    Analogy,
    Summary,
    Visual,
    PracticeQuestion,
    Mnemonic,
}

impl ContentNodeType {
    /// Return a human-readable name for this content type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Explanation => "explanation",
            Self::Example => "example",
            Self::Analogy => "analogy",
            Self::Summary => "summary",
            Self::Visual => "visual",
            Self::PracticeQuestion => "practice_question",
            Self::Mnemonic => "mnemonic",
        }
    }

    /// Parse a content type from a string name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "concept" => Some(Self::Concept),
            "explanation" => Some(Self::Explanation),
            "example" => Some(Self::Example),
            "analogy" => Some(Self::Analogy),
            "summary" => Some(Self::Summary),
            "visual" => Some(Self::Visual),
            "practice_question" | "practicequestion" | "question" => {
                Some(Self::PracticeQuestion)
            }
            "mnemonic" => Some(Self::Mnemonic),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentNodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a piece of content is delivered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    #[default]
    Text,
    Visual,
    Audio,
    Video,
    Interactive,
}

impl Modality {
    /// Return a human-readable name for this modality.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Visual => "visual",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Interactive => "interactive",
        }
    }

    /// Parse a modality from a string name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "visual" => Some(Self::Visual),
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            "interactive" => Some(Self::Interactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Where a piece of content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentOrigin {
    /// Extracted from a source document.
    #[default]
    Ingested,
    /// Produced by a text generator.
    Generated,
    /// Written by an instructor.
    Authored,
}

/// A piece of instructional material in the content graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    /// Unique identifier.
    pub id: String,
    /// Short display title.
    pub title: String,
    /// Body text (or caption for non-text modalities).
    #[serde(default)]
    pub body: String,
    /// Kind of material.
    pub content_type: ContentNodeType,
    /// Domain nodes this material addresses.
    #[serde(default)]
    pub domain_node_ids: Vec<String>,
    /// Delivery modality.
    #[serde(default)]
    pub modality: Modality,
    /// Difficulty on the ability scale.
    #[serde(default)]
    pub difficulty: f64,
    /// Cognitive level.
    #[serde(default)]
    pub bloom_level: BloomLevel,
    /// Editorial quality (0.0 - 1.0).
    #[serde(default)]
    pub quality_score: f64,
    /// Free-form labels.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Provenance.
    #[serde(default)]
    pub origin: ContentOrigin,
    /// Source document or generator reference.
    #[serde(default)]
    pub source_ref: Option<String>,
}

impl ContentNode {
    /// Create a text node with zero quality and no domain links.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content_type: ContentNodeType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: String::new(),
            content_type,
            domain_node_ids: Vec::new(),
            modality: Modality::default(),
            difficulty: 0.0,
            bloom_level: BloomLevel::default(),
            quality_score: 0.0,
            tags: Vec::new(),
            origin: ContentOrigin::default(),
            source_ref: None,
        }
    }

    /// Set the body text.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Link to a domain node.
    pub fn addressing(mut self, domain_node_id: impl Into<String>) -> Self {
        self.domain_node_ids.push(domain_node_id.into());
        self
    }

    /// Set the modality.
    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    /// Set the difficulty.
    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the Bloom level.
    pub fn with_bloom_level(mut self, level: BloomLevel) -> Self {
        self.bloom_level = level;
        self
    }

    /// Set the quality score (clamped to [0.0, 1.0]).
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality_score = quality.clamp(0.0, 1.0);
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set provenance.
    pub fn with_origin(mut self, origin: ContentOrigin, source_ref: Option<String>) -> Self {
        self.origin = origin;
        self.source_ref = source_ref;
        self
    }
}
