use trivia_core::discipline::CardEvent;
use trivia_core::model::SessionId;

use super::progress::SessionProgress;

/// Transient card pop-in shown after a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardOverlay {
    Yellow,
    Red,
}

impl CardOverlay {
    #[must_use]
    pub fn for_card(card: &CardEvent) -> Self {
        match card {
            CardEvent::Yellow => Self::Yellow,
            CardEvent::Red(_) => Self::Red,
        }
    }
}

/// The question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<String>,
    pub selected: Option<String>,
    /// Revealed once the question is answered or timed out.
    pub correct_answer: Option<String>,
}

/// Final scoreboard for a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub longest_streak: u32,
    pub red_card: bool,
}

/// Everything a front end needs to draw one frame of a quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub session_id: SessionId,
    /// 1-based, clamped to `total_questions`.
    pub question_number: usize,
    pub total_questions: usize,
    pub question: Option<QuestionView>,
    pub time_remaining_secs: f64,
    pub time_fraction: f64,
    pub timed_out: bool,
    pub answered: bool,
    pub last_points: Option<u32>,
    pub score: u32,
    pub streak: u32,
    pub yellow_badge: bool,
    pub overlay: Option<CardOverlay>,
    pub progress: SessionProgress,
    pub summary: Option<SummaryView>,
}
