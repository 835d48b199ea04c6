//! Assessment items and their three-parameter logistic scoring parameters.

use serde::{Deserialize, Serialize};

use super::node::BloomLevel;
use crate::engine::irt;
use crate::types::error::{CatError, CatResult};

/// Presentation shape of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemFormat {
    /// Select one of several choices.
    MultipleChoice,
    /// Short free-text answer.
    ShortAnswer,
    /// Clinical or applied scenario with a free response.
    CaseScenario,
    /// Explain a mechanism in prose.
    MechanisticExplanation,
}

impl ItemFormat {
    /// Return a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::ShortAnswer => "short_answer",
            Self::CaseScenario => "case_scenario",
            Self::MechanisticExplanation => "mechanistic_explanation",
        }
    }

    /// Parse a format from a string name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "multiple_choice" | "multiplechoice" | "mcq" => Some(Self::MultipleChoice),
            "short_answer" | "shortanswer" => Some(Self::ShortAnswer),
            "case_scenario" | "casescenario" => Some(Self::CaseScenario),
            "mechanistic_explanation" | "mechanisticexplanation" => {
                Some(Self::MechanisticExplanation)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One answer option of a multiple-choice item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemChoice {
    /// Choice text shown to the learner.
    pub text: String,
    /// Whether selecting this choice is correct.
    pub is_correct: bool,
}

impl ItemChoice {
    /// Create a choice.
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

/// Scoring parameters of the three-parameter logistic model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemParameter {
    /// Location `b` on the ability scale.
    pub difficulty: f64,
    /// Slope `a`.
    pub discrimination: f64,
    /// Lower asymptote `c`, the chance of a correct guess.
    pub guessing: f64,
}

impl ItemParameter {
    /// Create a parameter triple.
    pub fn new(difficulty: f64, discrimination: f64, guessing: f64) -> Self {
        Self {
            difficulty,
            discrimination,
            guessing,
        }
    }

    /// Probability of a correct response at ability `theta`.
    pub fn probability_correct(&self, theta: f64) -> f64 {
        irt::probability_correct(self, theta)
    }

    /// Fisher information contributed at ability `theta`.
    pub fn fisher_information(&self, theta: f64) -> f64 {
        irt::fisher_information(self, theta)
    }

    fn check(&self) -> Result<(), String> {
        if !self.difficulty.is_finite() {
            return Err(format!("difficulty must be finite, got {}", self.difficulty));
        }
        if !self.discrimination.is_finite() {
            return Err(format!(
                "discrimination must be finite, got {}",
                self.discrimination
            ));
        }
        if !self.guessing.is_finite() || !(0.0..=1.0).contains(&self.guessing) {
            return Err(format!("guessing must be in [0, 1], got {}", self.guessing));
        }
        Ok(())
    }
}

impl Default for ItemParameter {
    fn default() -> Self {
        Self::new(0.0, 1.0, 0.2)
    }
}

/// An assessment question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier.
    pub id: String,
    /// Question text.
    pub stem: String,
    /// Presentation shape.
    pub format: ItemFormat,
    /// Ordered answer options (empty for free-response formats).
    #[serde(default)]
    pub choices: Vec<ItemChoice>,
    /// 3PL scoring parameters.
    pub parameter: ItemParameter,
    /// Topic label.
    #[serde(default)]
    pub topic: String,
    /// Subtopic label.
    #[serde(default)]
    pub subtopic: String,
    /// Concepts this item provides evidence for.
    #[serde(default)]
    pub concept_ids: Vec<String>,
    /// Worked explanation shown after answering.
    #[serde(default)]
    pub explanation: String,
    /// Cognitive level the item targets.
    #[serde(default)]
    pub bloom_level: BloomLevel,
}

impl Item {
    /// Re-check the construction invariants, e.g. after deserializing.
    pub fn validate(&self) -> CatResult<()> {
        let fail = |reason: String| CatError::InvalidItem {
            id: self.id.clone(),
            reason,
        };
        if self.stem.trim().is_empty() {
            return Err(fail("stem is required".to_string()));
        }
        if self.format == ItemFormat::MultipleChoice && self.choices.len() < 2 {
            return Err(fail(format!(
                "multiple choice items need at least two choices, got {}",
                self.choices.len()
            )));
        }
        self.parameter.check().map_err(fail)
    }

    /// The first correct choice, if any.
    pub fn correct_choice(&self) -> Option<&ItemChoice> {
        self.choices.iter().find(|c| c.is_correct)
    }

    /// Score a selected choice index; out-of-range selections are incorrect.
    pub fn is_correct_choice(&self, index: usize) -> bool {
        self.choices.get(index).map(|c| c.is_correct).unwrap_or(false)
    }
}

/// Builder for constructing validated Item instances.
pub struct ItemBuilder {
    id: String,
    stem: String,
    format: ItemFormat,
    choices: Vec<ItemChoice>,
    parameter: ItemParameter,
    topic: String,
    subtopic: String,
    concept_ids: Vec<String>,
    explanation: String,
    bloom_level: BloomLevel,
}

impl ItemBuilder {
    /// Create a new builder with the required fields. Defaults to multiple choice.
    pub fn new(id: impl Into<String>, stem: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stem: stem.into(),
            format: ItemFormat::MultipleChoice,
            choices: Vec::new(),
            parameter: ItemParameter::default(),
            topic: String::new(),
            subtopic: String::new(),
            concept_ids: Vec::new(),
            explanation: String::new(),
            bloom_level: BloomLevel::default(),
        }
    }

    /// Set the item format.
    pub fn format(mut self, format: ItemFormat) -> Self {
        self.format = format;
        self
    }

    /// Append a choice.
    pub fn choice(mut self, text: impl Into<String>, is_correct: bool) -> Self {
        self.choices.push(ItemChoice::new(text, is_correct));
        self
    }

    /// Set the scoring parameters.
    pub fn parameter(mut self, difficulty: f64, discrimination: f64, guessing: f64) -> Self {
        self.parameter = ItemParameter::new(difficulty, discrimination, guessing);
        self
    }

    /// Set topic and subtopic labels.
    pub fn topic(mut self, topic: impl Into<String>, subtopic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self.subtopic = subtopic.into();
        self
    }

    /// Link a concept this item speaks to.
    pub fn concept(mut self, concept_id: impl Into<String>) -> Self {
        self.concept_ids.push(concept_id.into());
        self
    }

    /// Set the explanation text.
    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    /// Set the Bloom level.
    pub fn bloom_level(mut self, level: BloomLevel) -> Self {
        self.bloom_level = level;
        self
    }

    /// Build and validate the item.
    pub fn build(self) -> CatResult<Item> {
        let item = Item {
            id: self.id,
            stem: self.stem.trim().to_string(),
            format: self.format,
            choices: self.choices,
            parameter: self.parameter,
            topic: self.topic.trim().to_string(),
            subtopic: self.subtopic.trim().to_string(),
            concept_ids: self.concept_ids,
            explanation: self.explanation.trim().to_string(),
            bloom_level: self.bloom_level,
        };
        item.validate()?;
        Ok(item)
    }
}
