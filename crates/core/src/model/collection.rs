use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;
use crate::model::stats::percentage;

/// How a question was resolved, as far as the collection book cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerMark {
    Correct,
    Incorrect,
}

/// Per-user exposure record for one question.
///
/// Independent of scoring; only feeds "seen" progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub question_id: QuestionId,
    pub subcategory: String,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl CollectionEntry {
    #[must_use]
    pub fn first_sighting(
        question_id: QuestionId,
        subcategory: impl Into<String>,
        mark: AnswerMark,
        seen_at: DateTime<Utc>,
    ) -> Self {
        let mut entry = Self {
            question_id,
            subcategory: subcategory.into(),
            correct_count: 0,
            incorrect_count: 0,
            first_seen: seen_at,
            last_seen: seen_at,
        };
        entry.record(mark, seen_at);
        entry
    }

    /// Count another sighting. `first_seen` is never moved.
    pub fn record(&mut self, mark: AnswerMark, seen_at: DateTime<Utc>) {
        match mark {
            AnswerMark::Correct => self.correct_count = self.correct_count.saturating_add(1),
            AnswerMark::Incorrect => self.incorrect_count = self.incorrect_count.saturating_add(1),
        }
        self.last_seen = seen_at;
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.correct_count.saturating_add(self.incorrect_count)
    }

    #[must_use]
    pub fn correct_percent(&self) -> f64 {
        percentage(u64::from(self.correct_count), u64::from(self.total()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn record_keeps_first_seen() {
        let start = fixed_now();
        let mut entry = CollectionEntry::first_sighting(
            QuestionId::new("q1"),
            "UEFA",
            AnswerMark::Correct,
            start,
        );
        let later = start + Duration::hours(3);
        entry.record(AnswerMark::Incorrect, later);

        assert_eq!(entry.first_seen, start);
        assert_eq!(entry.last_seen, later);
        assert_eq!(entry.correct_count, 1);
        assert_eq!(entry.incorrect_count, 1);
        assert!((entry.correct_percent() - 50.0).abs() < f64::EPSILON);
    }
}
