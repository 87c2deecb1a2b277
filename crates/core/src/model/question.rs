use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question must offer at least two options")]
    TooFewOptions,

    #[error("duplicate option: {0}")]
    DuplicateOption(String),

    #[error("answer is not one of the options: {0}")]
    AnswerNotAnOption(String),

    #[error("category cannot be empty")]
    EmptyCategory,
}

/// Unknown difficulty mode string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty mode: {0}")]
pub struct ParseModeError(pub String);

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty tag carried by a stored question.
///
/// Anything other than `easy` or `hard` in the store is treated as `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Hard,
    #[default]
    #[serde(other)]
    Default,
}

impl Difficulty {
    /// Lenient mapping from a stored tag; unknown or missing tags are `Default`.
    #[must_use]
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("easy") => Self::Easy,
            Some("hard") => Self::Hard,
            _ => Self::Default,
        }
    }

    #[must_use]
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Hard => "hard",
            Self::Default => "default",
        }
    }
}

/// Selection strategy chosen by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyMode {
    /// Half easy-biased, half hard-biased picks.
    #[default]
    Default,
    Easy,
    Hard,
}

impl DifficultyMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Easy => "easy",
            Self::Hard => "hard",
        }
    }

    /// Whether a question with `difficulty` is eligible in this (non-default) mode.
    #[must_use]
    pub fn admits(self, difficulty: Difficulty) -> bool {
        match self {
            Self::Default => true,
            Self::Easy => matches!(difficulty, Difficulty::Easy | Difficulty::Default),
            Self::Hard => matches!(difficulty, Difficulty::Hard | Difficulty::Default),
        }
    }
}

impl FromStr for DifficultyMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "easy" => Ok(Self::Easy),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseModeError(s.to_owned())),
        }
    }
}

impl fmt::Display for DifficultyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice trivia question as fetched from the question store.
///
/// Immutable once built; the core only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    answer: String,
    category: String,
    subcategories: Vec<String>,
    difficulty: Difficulty,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or category is blank, fewer than two
    /// options are given, an option repeats, or the answer is not an option.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
        category: impl Into<String>,
        subcategories: Vec<String>,
        difficulty: Difficulty,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        let answer = answer.into();
        let category = category.into();

        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if category.trim().is_empty() {
            return Err(QuestionError::EmptyCategory);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions);
        }
        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if !seen.insert(option.as_str()) {
                return Err(QuestionError::DuplicateOption(option.clone()));
            }
        }
        if !options.contains(&answer) {
            return Err(QuestionError::AnswerNotAnOption(answer));
        }

        Ok(Self {
            id,
            text,
            options,
            answer,
            category,
            subcategories,
            difficulty,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn subcategories(&self) -> &[String] {
        &self.subcategories
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn has_subcategory(&self, tag: &str) -> bool {
        self.subcategories.iter().any(|s| s == tag)
    }

    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        self.answer == option
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn valid_question_builds() {
        let q = Question::new(
            QuestionId::new("1"),
            "Who won the 2010 World Cup?",
            opts(&["Spain", "Netherlands", "Germany", "Uruguay"]),
            "Spain",
            "International",
            vec!["World Cup".into()],
            Difficulty::Easy,
        )
        .unwrap();
        assert!(q.is_correct("Spain"));
        assert!(!q.is_correct("Germany"));
        assert!(q.has_subcategory("World Cup"));
    }

    #[test]
    fn answer_must_be_an_option() {
        let err = Question::new(
            QuestionId::new("1"),
            "Q",
            opts(&["A", "B"]),
            "C",
            "International",
            Vec::new(),
            Difficulty::Default,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::AnswerNotAnOption("C".into()));
    }

    #[test]
    fn duplicate_options_rejected() {
        let err = Question::new(
            QuestionId::new("1"),
            "Q",
            opts(&["A", "A"]),
            "A",
            "International",
            Vec::new(),
            Difficulty::Default,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::DuplicateOption(_)));
    }

    #[test]
    fn difficulty_tag_is_lenient() {
        assert_eq!(Difficulty::from_tag(Some("easy")), Difficulty::Easy);
        assert_eq!(Difficulty::from_tag(Some("medium")), Difficulty::Default);
        assert_eq!(Difficulty::from_tag(None), Difficulty::Default);
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Default".parse::<DifficultyMode>().unwrap(), DifficultyMode::Default);
        assert_eq!("HARD".parse::<DifficultyMode>().unwrap(), DifficultyMode::Hard);
        assert!("expert".parse::<DifficultyMode>().is_err());
    }

    #[test]
    fn easy_mode_admits_untagged_questions() {
        assert!(DifficultyMode::Easy.admits(Difficulty::Default));
        assert!(DifficultyMode::Easy.admits(Difficulty::Easy));
        assert!(!DifficultyMode::Easy.admits(Difficulty::Hard));
    }
}
