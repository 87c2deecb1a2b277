use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("answered questions ({answered}) exceed quiz length ({total})")]
    TooManyAnswers { answered: u32, total: u32 },

    #[error("at most one yellow card can be booked per session, got {0}")]
    TooManyYellowCards(u32),
}

/// Terminal aggregate of one finished quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total_questions: u32,
    score: u32,
    correct_answers: u32,
    incorrect_answers: u32,
    longest_streak: u32,
    longest_wrong_streak: u32,
    yellow_cards: u32,
    red_card: bool,
}

impl SessionSummary {
    /// Build a summary from the session's final tallies.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError` if the timestamps are inverted, more
    /// questions were answered than the quiz holds, or more than one yellow
    /// card is reported.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total_questions: u32,
        score: u32,
        correct_answers: u32,
        incorrect_answers: u32,
        longest_streak: u32,
        longest_wrong_streak: u32,
        yellow_cards: u32,
        red_card: bool,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        let answered = correct_answers.saturating_add(incorrect_answers);
        if answered > total_questions {
            return Err(SessionSummaryError::TooManyAnswers {
                answered,
                total: total_questions,
            });
        }
        if yellow_cards > 1 {
            return Err(SessionSummaryError::TooManyYellowCards(yellow_cards));
        }

        Ok(Self {
            started_at,
            completed_at,
            total_questions,
            score,
            correct_answers,
            incorrect_answers,
            longest_streak,
            longest_wrong_streak,
            yellow_cards,
            red_card,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> u32 {
        self.incorrect_answers
    }

    #[must_use]
    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    #[must_use]
    pub fn longest_wrong_streak(&self) -> u32 {
        self.longest_wrong_streak
    }

    #[must_use]
    pub fn yellow_cards(&self) -> u32 {
        self.yellow_cards
    }

    #[must_use]
    pub fn red_card(&self) -> bool {
        self.red_card
    }

    /// Every question in the set was answered correctly.
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total_questions > 0 && self.correct_answers == self.total_questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn perfect_requires_every_question() {
        let now = fixed_now();
        let perfect = SessionSummary::new(now, now, 10, 9000, 10, 0, 10, 0, 0, false).unwrap();
        assert!(perfect.is_perfect());

        let short = SessionSummary::new(now, now, 10, 900, 1, 6, 1, 6, 1, true).unwrap();
        assert!(!short.is_perfect());
    }

    #[test]
    fn rejects_more_answers_than_questions() {
        let now = fixed_now();
        let err = SessionSummary::new(now, now, 2, 0, 2, 1, 2, 1, 0, false).unwrap_err();
        assert_eq!(
            err,
            SessionSummaryError::TooManyAnswers {
                answered: 3,
                total: 2
            }
        );
    }

    #[test]
    fn rejects_second_yellow_count() {
        let now = fixed_now();
        let err = SessionSummary::new(now, now, 10, 0, 0, 6, 0, 3, 2, true).unwrap_err();
        assert_eq!(err, SessionSummaryError::TooManyYellowCards(2));
    }
}
