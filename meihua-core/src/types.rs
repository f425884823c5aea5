//! Core types shared across the divination engine.
//!
//! With the `typescript` feature enabled, the plain enums can be exported to
//! TypeScript using ts-rs for the web client.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// One of the five elements (wuxing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Metal,
    Wood,
    Water,
    Fire,
    Earth,
}

impl Element {
    /// All elements in canonical order.
    pub const ALL: [Element; 5] = [
        Element::Metal,
        Element::Wood,
        Element::Water,
        Element::Fire,
        Element::Earth,
    ];

    /// Lowercase English tag, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metal => "metal",
            Self::Wood => "wood",
            Self::Water => "water",
            Self::Fire => "fire",
            Self::Earth => "earth",
        }
    }

    /// Single-character Chinese name.
    pub fn chinese(&self) -> &'static str {
        match self {
            Self::Metal => "金",
            Self::Wood => "木",
            Self::Water => "水",
            Self::Fire => "火",
            Self::Earth => "土",
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Five-level qualitative outcome of a divination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum FortuneCategory {
    Excellent,
    Good,
    Neutral,
    Poor,
    Bad,
}

impl FortuneCategory {
    /// All categories, best first.
    pub const ALL: [FortuneCategory; 5] = [
        FortuneCategory::Excellent,
        FortuneCategory::Good,
        FortuneCategory::Neutral,
        FortuneCategory::Poor,
        FortuneCategory::Bad,
    ];

    /// Map a fortune score onto a category.
    ///
    /// Thresholds are checked from the top down; the first match wins.
    pub fn from_score(score: i32) -> Self {
        if score >= 85 {
            Self::Excellent
        } else if score >= 70 {
            Self::Good
        } else if score >= 50 {
            Self::Neutral
        } else if score >= 30 {
            Self::Poor
        } else {
            Self::Bad
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Neutral => "neutral",
            Self::Poor => "poor",
            Self::Bad => "bad",
        }
    }

    /// Short Chinese description used in prompts and summaries.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "大吉",
            Self::Good => "吉利",
            Self::Neutral => "平平",
            Self::Poor => "不利",
            Self::Bad => "凶险",
        }
    }
}

impl std::fmt::Display for FortuneCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FortuneCategory {
    type Err = DivinationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DivinationError::InvalidInput(format!("unknown fortune category: {s}")))
    }
}

/// Domain of the question being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Career,
    Relationship,
    Health,
    Wealth,
    Study,
    #[default]
    General,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 6] = [
        QuestionCategory::Career,
        QuestionCategory::Relationship,
        QuestionCategory::Health,
        QuestionCategory::Wealth,
        QuestionCategory::Study,
        QuestionCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Career => "career",
            Self::Relationship => "relationship",
            Self::Health => "health",
            Self::Wealth => "wealth",
            Self::Study => "study",
            Self::General => "general",
        }
    }

    /// Chinese description of the domain.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Career => "事业发展",
            Self::Relationship => "感情婚姻",
            Self::Health => "健康状况",
            Self::Wealth => "财运投资",
            Self::Study => "学业考试",
            Self::General => "综合运势",
        }
    }
}

impl std::str::FromStr for QuestionCategory {
    type Err = DivinationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DivinationError::InvalidInput(format!("unknown question category: {s}")))
    }
}

/// Error types produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DivinationError {
    /// Caller supplied malformed or out-of-range input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A static table produced an impossible value
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl DivinationError {
    /// Whether the caller can recover by correcting its input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, DivinationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_boundaries() {
        assert_eq!(FortuneCategory::from_score(85), FortuneCategory::Excellent);
        assert_eq!(FortuneCategory::from_score(84), FortuneCategory::Good);
        assert_eq!(FortuneCategory::from_score(70), FortuneCategory::Good);
        assert_eq!(FortuneCategory::from_score(69), FortuneCategory::Neutral);
        assert_eq!(FortuneCategory::from_score(50), FortuneCategory::Neutral);
        assert_eq!(FortuneCategory::from_score(49), FortuneCategory::Poor);
        assert_eq!(FortuneCategory::from_score(30), FortuneCategory::Poor);
        assert_eq!(FortuneCategory::from_score(29), FortuneCategory::Bad);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("study".parse::<QuestionCategory>().unwrap(), QuestionCategory::Study);
        assert!("lottery".parse::<QuestionCategory>().is_err());
        assert_eq!("poor".parse::<FortuneCategory>().unwrap(), FortuneCategory::Poor);
    }

    #[test]
    fn test_serde_tags() {
        let json = serde_json::to_string(&Element::Water).unwrap();
        assert_eq!(json, "\"water\"");
        let fortune: FortuneCategory = serde_json::from_str("\"excellent\"").unwrap();
        assert_eq!(fortune, FortuneCategory::Excellent);
    }

    #[test]
    fn test_error_recoverability() {
        assert!(DivinationError::InvalidInput("x".into()).is_recoverable());
        assert!(!DivinationError::InternalInconsistency("x".into()).is_recoverable());
    }
}
