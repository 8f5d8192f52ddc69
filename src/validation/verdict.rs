#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use bon::Builder;
use colored::Color;
use serde::{Deserialize, Serialize};

use crate::constants::VALIDATION_FAILED_FEEDBACK;

/// How well the learner appears to understand the snippet, as judged by the
/// evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderstandingLevel {
    /// Complete and accurate explanation.
    Excellent,
    /// Mostly right, minor gaps.
    Good,
    /// Some key ideas present, others missing or wrong.
    Partial,
    /// The explanation does not yet show understanding.
    NeedsWork,
}

/// Presentation attributes for an [`UnderstandingLevel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelStyle {
    /// Accent color for the result banner.
    pub color: Color,
    /// Emoji shown next to the level label.
    pub emoji: &'static str,
    /// Human-readable label.
    pub label: &'static str,
}

impl UnderstandingLevel {
    /// All levels, best first.
    pub const ALL: [UnderstandingLevel; 4] = [
        UnderstandingLevel::Excellent,
        UnderstandingLevel::Good,
        UnderstandingLevel::Partial,
        UnderstandingLevel::NeedsWork,
    ];

    /// Returns the presentation attributes for this level.
    pub fn style(self) -> LevelStyle {
        match self {
            UnderstandingLevel::Excellent => LevelStyle {
                color: Color::Green,
                emoji: "🌟",
                label: "Excellent",
            },
            UnderstandingLevel::Good => LevelStyle {
                color: Color::Blue,
                emoji: "👍",
                label: "Good",
            },
            UnderstandingLevel::Partial => LevelStyle {
                color: Color::Yellow,
                emoji: "🤔",
                label: "Partial",
            },
            UnderstandingLevel::NeedsWork => LevelStyle {
                color: Color::Red,
                emoji: "📚",
                label: "Needs work",
            },
        }
    }
}

impl Display for UnderstandingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.style().label)
    }
}

/// The evaluator's judgment of one explanation.
///
/// `passed` and `understanding_level` are set independently by the evaluator;
/// nothing here assumes they agree.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    /// Whether the explanation was accepted.
    pub passed:              bool,
    /// Judged depth of understanding.
    pub understanding_level: UnderstandingLevel,
    /// Feedback for the learner, as Markdown.
    pub feedback:            String,
    /// Concepts the explanation covered, in evaluator order.
    #[serde(default)]
    #[builder(default)]
    pub concepts_covered:    Vec<String>,
    /// Concepts the explanation missed, in evaluator order.
    #[serde(default)]
    #[builder(default)]
    pub concepts_missed:     Vec<String>,
    /// Questions the learner could think about next.
    #[serde(default)]
    #[builder(default)]
    pub follow_up_questions: Vec<String>,
}

impl ValidationVerdict {
    /// The verdict substituted when the evaluator call fails for any reason.
    pub fn degraded() -> Self {
        Self::builder()
            .passed(false)
            .understanding_level(UnderstandingLevel::NeedsWork)
            .feedback(VALIDATION_FAILED_FEEDBACK)
            .build()
    }
}
