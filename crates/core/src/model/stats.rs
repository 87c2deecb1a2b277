use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::session::SessionSummary;

/// `part / whole` as a percentage, or 0 when nothing has been counted yet.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

//
// ─── SCORE DISTRIBUTION ────────────────────────────────────────────────────────
//

/// Histogram of sessions keyed by "correct answers this session".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreDistribution(BTreeMap<u32, u64>);

impl ScoreDistribution {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, correct_answers: u32) {
        *self.0.entry(correct_answers).or_insert(0) += 1;
    }

    #[must_use]
    pub fn count(&self, correct_answers: u32) -> u64 {
        self.0.get(&correct_answers).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dense `(bucket, count)` rows for buckets `0..=max_bucket`.
    #[must_use]
    pub fn buckets(&self, max_bucket: u32) -> Vec<(u32, u64)> {
        (0..=max_bucket).map(|b| (b, self.count(b))).collect()
    }
}

//
// ─── DELTAS ────────────────────────────────────────────────────────────────────
//

/// Increment produced by one finished session for the overall record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsDelta {
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub perfect: bool,
    pub longest_streak_correct: u32,
    pub longest_streak_wrong: u32,
    pub yellow_cards: u32,
    pub red_card: bool,
}

impl StatsDelta {
    #[must_use]
    pub fn from_summary(summary: &SessionSummary) -> Self {
        Self {
            correct_answers: summary.correct_answers(),
            incorrect_answers: summary.incorrect_answers(),
            perfect: summary.is_perfect(),
            longest_streak_correct: summary.longest_streak(),
            longest_streak_wrong: summary.longest_wrong_streak(),
            yellow_cards: summary.yellow_cards(),
            red_card: summary.red_card(),
        }
    }
}

/// Increment for the per-subcategory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStatsDelta {
    pub correct_answers: u32,
    pub incorrect_answers: u32,
}

impl CategoryStatsDelta {
    #[must_use]
    pub fn from_summary(summary: &SessionSummary) -> Self {
        Self {
            correct_answers: summary.correct_answers(),
            incorrect_answers: summary.incorrect_answers(),
        }
    }
}

//
// ─── CUMULATIVE STATS ──────────────────────────────────────────────────────────
//

/// Per-user lifetime totals. Merged, never replaced.
///
/// The percentage fields are denormalized and always reflect the counters
/// after the most recent [`CumulativeStats::apply`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeStats {
    pub total_quizzes: u64,
    pub correct_answers: u64,
    pub incorrect_answers: u64,
    pub total_perfect_quizzes: u64,
    pub longest_streak_correct: u32,
    pub longest_streak_wrong: u32,
    pub yellow_cards: u64,
    pub red_cards: u64,
    pub score_distribution: ScoreDistribution,

    pub correct_percentage: f64,
    pub perfect_quiz_percentage: f64,
    pub yellow_card_rate: f64,
    pub red_card_rate: f64,
}

impl CumulativeStats {
    /// Fold one finished session into the totals.
    pub fn apply(&mut self, delta: &StatsDelta) {
        self.total_quizzes += 1;
        self.correct_answers += u64::from(delta.correct_answers);
        self.incorrect_answers += u64::from(delta.incorrect_answers);
        if delta.perfect {
            self.total_perfect_quizzes += 1;
        }
        self.longest_streak_correct = self.longest_streak_correct.max(delta.longest_streak_correct);
        self.longest_streak_wrong = self.longest_streak_wrong.max(delta.longest_streak_wrong);
        self.yellow_cards += u64::from(delta.yellow_cards);
        if delta.red_card {
            self.red_cards += 1;
        }
        self.score_distribution.record(delta.correct_answers);
        self.recompute_derived();
    }

    pub fn recompute_derived(&mut self) {
        self.correct_percentage = percentage(
            self.correct_answers,
            self.correct_answers + self.incorrect_answers,
        );
        self.perfect_quiz_percentage = percentage(self.total_perfect_quizzes, self.total_quizzes);
        self.yellow_card_rate = percentage(self.yellow_cards, self.total_quizzes);
        self.red_card_rate = percentage(self.red_cards, self.total_quizzes);
    }
}

/// Totals scoped to one effective subcategory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub subcategory: String,
    pub quizzes_played: u64,
    pub correct_answers: u64,
    pub incorrect_answers: u64,
    pub correct_percentage: f64,
}

impl CategoryStats {
    #[must_use]
    pub fn empty(subcategory: impl Into<String>) -> Self {
        Self {
            subcategory: subcategory.into(),
            ..Self::default()
        }
    }

    pub fn apply(&mut self, delta: CategoryStatsDelta) {
        self.quizzes_played += 1;
        self.correct_answers += u64::from(delta.correct_answers);
        self.incorrect_answers += u64::from(delta.incorrect_answers);
        self.correct_percentage = percentage(
            self.correct_answers,
            self.correct_answers + self.incorrect_answers,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(correct: u32, incorrect: u32) -> StatsDelta {
        StatsDelta {
            correct_answers: correct,
            incorrect_answers: incorrect,
            perfect: incorrect == 0,
            longest_streak_correct: correct,
            longest_streak_wrong: incorrect,
            yellow_cards: 0,
            red_card: false,
        }
    }

    #[test]
    fn apply_accumulates_and_derives_from_new_totals() {
        let mut stats = CumulativeStats::default();
        stats.apply(&delta(10, 0));
        stats.apply(&StatsDelta {
            yellow_cards: 1,
            red_card: true,
            ..delta(2, 6)
        });

        assert_eq!(stats.total_quizzes, 2);
        assert_eq!(stats.correct_answers, 12);
        assert_eq!(stats.incorrect_answers, 6);
        assert_eq!(stats.total_perfect_quizzes, 1);
        assert_eq!(stats.longest_streak_correct, 10);
        assert_eq!(stats.longest_streak_wrong, 6);
        assert_eq!(stats.yellow_cards, 1);
        assert_eq!(stats.red_cards, 1);
        assert!((stats.correct_percentage - 66.666_666).abs() < 1e-3);
        assert!((stats.perfect_quiz_percentage - 50.0).abs() < f64::EPSILON);
        assert!((stats.red_card_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.score_distribution.count(10), 1);
        assert_eq!(stats.score_distribution.count(2), 1);
    }

    #[test]
    fn longest_streaks_only_grow() {
        let mut stats = CumulativeStats::default();
        stats.apply(&delta(7, 3));
        stats.apply(&delta(2, 1));
        assert_eq!(stats.longest_streak_correct, 7);
        assert_eq!(stats.longest_streak_wrong, 3);
    }

    #[test]
    fn category_stats_track_played_and_percent() {
        let mut stats = CategoryStats::empty("UEFA");
        stats.apply(CategoryStatsDelta {
            correct_answers: 3,
            incorrect_answers: 1,
        });
        assert_eq!(stats.quizzes_played, 1);
        assert!((stats.correct_percentage - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn distribution_buckets_are_dense() {
        let mut dist = ScoreDistribution::new();
        dist.record(3);
        let rows = dist.buckets(10);
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[3], (3, 1));
        assert_eq!(rows[0], (0, 0));
    }

    #[test]
    fn percentage_of_nothing_is_zero() {
        assert!(percentage(0, 0).abs() < f64::EPSILON);
    }
}
