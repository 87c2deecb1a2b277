use chrono::{DateTime, Utc};

use trivia_core::QuizSettings;
use trivia_core::discipline::{AnswerOutcome, CardEvent, CardThresholds, Discipline};
use trivia_core::model::{
    AnswerMark, Question, QuestionId, SessionId, SessionSummary, UserId, collection_subcategory,
};
use trivia_core::scoring::award;
use trivia_core::timer::{CountdownTimer, TickOutcome};

use super::plan::{QuizRequest, QuizSet};
use super::progress::SessionProgress;
use super::signals::{SessionSignal, SignalKind};
use super::view::{CardOverlay, QuestionView, SessionView, SummaryView};
use crate::error::SessionError;

//
// ─── QUESTION RESULT ───────────────────────────────────────────────────────────
//

/// How a single question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionOutcome {
    Correct { points: u32 },
    Wrong,
    TimedOut,
}

impl QuestionOutcome {
    /// Collection-book mark; a timeout counts as incorrect.
    #[must_use]
    pub fn mark(self) -> AnswerMark {
        match self {
            Self::Correct { .. } => AnswerMark::Correct,
            Self::Wrong | Self::TimedOut => AnswerMark::Incorrect,
        }
    }
}

/// Captures the outcome of one question within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub outcome: QuestionOutcome,
    pub cards: Vec<CardEvent>,
}

/// What applying a timed signal did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalOutcome {
    /// Stale session id, or nothing to do.
    Ignored,
    Ticked,
    TimedOut(QuestionResult),
    OverlayHidden,
    Ended,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One play-through of a quiz set.
///
/// Owns the countdown, the running tallies and the discipline state. Timed
/// callbacks are fed in through [`QuizSession::apply_signal`]; the session
/// itself never spawns anything.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: SessionId,
    user: UserId,
    request: QuizRequest,
    settings: QuizSettings,
    thresholds: CardThresholds,
    quiz: QuizSet,
    current: usize,
    selected: Option<String>,
    answered: bool,
    timer: CountdownTimer,
    score: u32,
    correct_answers: u32,
    incorrect_answers: u32,
    streak: u32,
    longest_streak: u32,
    last_points: Option<u32>,
    discipline: Discipline,
    overlay: Option<CardOverlay>,
    results: Vec<QuestionResult>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    stats_recorded: bool,
}

impl QuizSession {
    /// Start a session over `quiz`, with the first question's timer running.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the quiz set holds no questions.
    pub fn new(
        user: UserId,
        request: QuizRequest,
        settings: QuizSettings,
        quiz: QuizSet,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if quiz.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            id: SessionId::generate(),
            user,
            request,
            thresholds: CardThresholds::from_settings(&settings),
            timer: CountdownTimer::from_settings(&settings),
            settings,
            quiz,
            current: 0,
            selected: None,
            answered: false,
            score: 0,
            correct_answers: 0,
            incorrect_answers: 0,
            streak: 0,
            longest_streak: 0,
            last_points: None,
            discipline: Discipline::new(),
            overlay: None,
            results: Vec::new(),
            started_at,
            completed_at: None,
            stats_recorded: false,
        })
    }

    //
    // ─── ACTIONS ───────────────────────────────────────────────────────────────
    //

    /// Lock in `option` for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` or `SessionError::SentOff` once play
    /// is over, `SessionError::AlreadyAnswered` for a second selection, and
    /// `SessionError::UnknownOption` if `option` is not on the card.
    pub fn select(&mut self, option: &str) -> Result<QuestionResult, SessionError> {
        self.ensure_playable()?;
        if self.answered {
            return Err(SessionError::AlreadyAnswered);
        }

        let (question_id, is_correct) = {
            let question = self.current_question().ok_or(SessionError::Completed)?;
            if !question.options().iter().any(|o| o == option) {
                return Err(SessionError::UnknownOption(option.to_owned()));
            }
            (question.id().clone(), question.is_correct(option))
        };

        self.selected = Some(option.to_owned());
        self.answered = true;
        self.timer.stop();

        let (outcome, cards) = if is_correct {
            let points = award(self.timer.elapsed_ticks(), &self.settings.scoring());
            self.score = self.score.saturating_add(points);
            self.correct_answers += 1;
            self.streak += 1;
            self.longest_streak = self.longest_streak.max(self.streak);
            self.last_points = Some(points);
            self.apply_discipline(AnswerOutcome::Correct);
            if self.overlay == Some(CardOverlay::Yellow) {
                self.overlay = None;
            }
            (QuestionOutcome::Correct { points }, Vec::new())
        } else {
            self.last_points = Some(0);
            self.streak = 0;
            self.incorrect_answers += 1;
            let cards = self.apply_discipline(AnswerOutcome::Wrong);
            (QuestionOutcome::Wrong, cards)
        };

        Ok(self.push_result(question_id, outcome, cards))
    }

    /// Advance to the next question, or complete the session after the last.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAnswered` while the current question is open,
    /// and `SessionError::Completed`/`SessionError::SentOff` once play is over.
    pub fn next_question(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.ensure_playable()?;
        if !self.answered {
            return Err(SessionError::NotAnswered);
        }

        self.current += 1;
        self.selected = None;
        self.answered = false;
        self.last_points = None;
        if self.overlay == Some(CardOverlay::Yellow) {
            self.overlay = None;
        }

        if self.current >= self.quiz.len() {
            self.timer.stop();
            self.completed_at = Some(now);
        } else {
            self.timer.restart();
        }
        Ok(())
    }

    /// Feed one countdown tick. Returns the timeout result when the budget
    /// runs out on this tick.
    pub fn tick(&mut self) -> Option<QuestionResult> {
        if self.is_complete() || self.discipline.is_sent_off() {
            return None;
        }

        match self.timer.tick(self.answered) {
            TickOutcome::Expired => Some(self.expire()),
            TickOutcome::Inert | TickOutcome::Running { .. } => None,
        }
    }

    /// Complete a sent-off session early. Returns false if there was nothing
    /// to end.
    pub fn end_after_red_card(&mut self, now: DateTime<Utc>) -> bool {
        if !self.discipline.is_sent_off() || self.is_complete() {
            return false;
        }

        self.current = self.quiz.len();
        self.timer.stop();
        self.overlay = None;
        self.completed_at = Some(now);
        true
    }

    /// Hide `overlay` only if it is still the one on screen.
    pub fn hide_overlay_if(&mut self, overlay: CardOverlay) -> bool {
        if self.overlay == Some(overlay) {
            self.overlay = None;
            true
        } else {
            false
        }
    }

    /// Apply a timed callback. Signals tagged with another session id are
    /// ignored.
    pub fn apply_signal(&mut self, signal: &SessionSignal, now: DateTime<Utc>) -> SignalOutcome {
        if signal.session != self.id {
            return SignalOutcome::Ignored;
        }

        match signal.kind {
            SignalKind::Tick => match self.tick() {
                Some(result) => SignalOutcome::TimedOut(result),
                None => SignalOutcome::Ticked,
            },
            SignalKind::HideOverlay(overlay) => {
                if self.hide_overlay_if(overlay) {
                    SignalOutcome::OverlayHidden
                } else {
                    SignalOutcome::Ignored
                }
            }
            SignalKind::RedCardWhistle => {
                if self.end_after_red_card(now) {
                    SignalOutcome::Ended
                } else {
                    SignalOutcome::Ignored
                }
            }
        }
    }

    fn expire(&mut self) -> QuestionResult {
        let question_id = self
            .current_question()
            .map(|q| q.id().clone())
            .unwrap_or_else(|| QuestionId::new(""));
        self.answered = true;
        self.streak = 0;
        self.incorrect_answers += 1;
        self.last_points = None;
        self.push_result(question_id, QuestionOutcome::TimedOut, Vec::new())
    }

    fn apply_discipline(&mut self, outcome: AnswerOutcome) -> Vec<CardEvent> {
        let (next, cards) = self.discipline.transition(outcome, self.thresholds);
        self.discipline = next;
        for card in &cards {
            self.overlay = Some(CardOverlay::for_card(card));
        }
        cards
    }

    fn push_result(
        &mut self,
        question_id: QuestionId,
        outcome: QuestionOutcome,
        cards: Vec<CardEvent>,
    ) -> QuestionResult {
        let result = QuestionResult {
            question_id,
            outcome,
            cards,
        };
        self.results.push(result.clone());
        result
    }

    fn ensure_playable(&self) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if self.discipline.is_sent_off() {
            return Err(SessionError::SentOff);
        }
        Ok(())
    }

    pub(crate) fn mark_stats_recorded(&mut self) -> bool {
        if self.stats_recorded {
            return false;
        }
        self.stats_recorded = true;
        true
    }

    //
    // ─── READ ──────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn user(&self) -> &UserId {
        &self.user
    }

    #[must_use]
    pub fn request(&self) -> &QuizRequest {
        &self.request
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizSet {
        &self.quiz
    }

    /// Collection-book page for `question`, judged by its own tags.
    #[must_use]
    pub fn collection_subcategory(&self, question: &QuestionId) -> &str {
        let tags = self
            .quiz
            .questions()
            .iter()
            .find(|q| q.id() == question)
            .map_or(&[][..], Question::subcategories);
        collection_subcategory(tags, &self.request.category, &self.request.subcategory)
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.get(self.current)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answered
    }

    #[must_use]
    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
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
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    #[must_use]
    pub fn last_points(&self) -> Option<u32> {
        self.last_points
    }

    #[must_use]
    pub fn discipline(&self) -> &Discipline {
        &self.discipline
    }

    #[must_use]
    pub fn overlay(&self) -> Option<CardOverlay> {
        self.overlay
    }

    #[must_use]
    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    #[must_use]
    pub fn stats_recorded(&self) -> bool {
        self.stats_recorded
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.quiz.len();
        let answered = self.results.len();
        SessionProgress {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            is_complete: self.is_complete(),
        }
    }

    /// Build the persisted summary for a completed session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InProgress` before completion, or
    /// `SessionError::Summary` if the tallies are inconsistent.
    pub fn summary(&self) -> Result<SessionSummary, SessionError> {
        let completed_at = self.completed_at.ok_or(SessionError::InProgress)?;
        let total = u32::try_from(self.quiz.len()).unwrap_or(u32::MAX);
        let summary = SessionSummary::new(
            self.started_at,
            completed_at,
            total,
            self.score,
            self.correct_answers,
            self.incorrect_answers,
            self.longest_streak,
            self.discipline.longest_wrong_streak(),
            self.discipline.yellow_cards(),
            self.discipline.is_sent_off(),
        )?;
        Ok(summary)
    }

    /// Snapshot of everything a front end draws.
    #[must_use]
    pub fn view(&self) -> SessionView {
        let total = self.quiz.len();
        let question = self.current_question().map(|q| QuestionView {
            text: q.text().to_owned(),
            options: q.options().to_vec(),
            selected: self.selected.clone(),
            correct_answer: self.answered.then(|| q.answer().to_owned()),
        });
        let summary = self.is_complete().then(|| SummaryView {
            score: self.score,
            correct_answers: self.correct_answers,
            total_questions: u32::try_from(total).unwrap_or(u32::MAX),
            longest_streak: self.longest_streak,
            red_card: self.discipline.is_sent_off(),
        });

        SessionView {
            session_id: self.id,
            question_number: (self.current + 1).min(total),
            total_questions: total,
            question,
            time_remaining_secs: self.timer.remaining_secs(),
            time_fraction: self.timer.remaining_fraction(),
            timed_out: self.answered && self.selected.is_none(),
            answered: self.answered,
            last_points: self.last_points,
            score: self.score,
            streak: self.streak,
            yellow_badge: self.discipline.shows_yellow_badge(),
            overlay: self.overlay,
            progress: self.progress(),
            summary,
        }
    }
}
