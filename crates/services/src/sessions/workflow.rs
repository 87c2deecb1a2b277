use std::sync::Arc;

use rand::Rng;
use tracing::{info, warn};

use storage::repository::QuestionRepository;
use trivia_core::QuizSettings;
use trivia_core::model::UserId;

use super::plan::QuizRequest;
use super::queries::SessionQueries;
use super::service::{QuestionResult, QuizSession, SignalOutcome};
use super::signals::SessionSignal;
use crate::Clock;
use crate::collection_service::CollectionService;
use crate::error::SessionError;
use crate::stats_service::StatsService;

/// Result of a player action within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAnswerResult {
    pub result: QuestionResult,
    pub is_complete: bool,
}

/// Orchestrates session start, answering and best-effort persistence.
///
/// Collection entries are written per resolved question; cumulative stats are
/// merged exactly once when a session completes. Persistence failures are
/// logged and never change local session state.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    settings: QuizSettings,
    questions: Arc<dyn QuestionRepository>,
    stats: StatsService,
    collection: CollectionService,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: QuizSettings,
        questions: Arc<dyn QuestionRepository>,
        stats: StatsService,
        collection: CollectionService,
    ) -> Self {
        Self {
            clock,
            settings,
            questions,
            stats,
            collection,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Start a new session with a thread-local random source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions could be selected,
    /// including when the fetch itself failed.
    pub async fn start_session(
        &self,
        user: UserId,
        request: QuizRequest,
    ) -> Result<QuizSession, SessionError> {
        let pool = SessionQueries::load_pool(self.questions.as_ref(), &request).await;
        let session = SessionQueries::open_session(
            user,
            request,
            &self.settings,
            pool,
            self.clock.now(),
            &mut rand::rng(),
        )?;
        Self::log_started(&session);
        Ok(session)
    }

    /// Start a new session drawing shuffles from `rng`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions could be selected.
    pub async fn start_session_with_rng<R: Rng + Send + ?Sized>(
        &self,
        user: UserId,
        request: QuizRequest,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        let pool = SessionQueries::load_pool(self.questions.as_ref(), &request).await;
        let session =
            SessionQueries::open_session(user, request, &self.settings, pool, self.clock.now(), rng)?;
        Self::log_started(&session);
        Ok(session)
    }

    /// Answer the current question and record the sighting.
    ///
    /// # Errors
    ///
    /// Returns the `SessionError` from [`QuizSession::select`]; persistence
    /// failures are not errors here.
    pub async fn answer_current(
        &self,
        session: &mut QuizSession,
        option: &str,
    ) -> Result<SessionAnswerResult, SessionError> {
        let result = session.select(option)?;
        self.record_sighting(session, &result).await;
        for card in &result.cards {
            info!(session_id = %session.id(), user_id = %session.user(), ?card, "card shown");
        }

        Ok(SessionAnswerResult {
            result,
            is_complete: session.is_complete(),
        })
    }

    /// Move on to the next question; merges stats if that completed the session.
    ///
    /// # Errors
    ///
    /// Returns the `SessionError` from [`QuizSession::next_question`].
    pub async fn next_question(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        session.next_question(self.clock.now())?;
        self.finalize_if_complete(session).await;
        Ok(())
    }

    /// Apply a timed signal, persisting any timeout and merging stats if the
    /// signal ended the session.
    pub async fn on_signal(
        &self,
        session: &mut QuizSession,
        signal: &SessionSignal,
    ) -> SignalOutcome {
        let outcome = session.apply_signal(signal, self.clock.now());
        match &outcome {
            SignalOutcome::TimedOut(result) => self.record_sighting(session, result).await,
            SignalOutcome::Ended => {
                self.finalize_if_complete(session).await;
            }
            SignalOutcome::Ignored | SignalOutcome::Ticked | SignalOutcome::OverlayHidden => {}
        }
        outcome
    }

    /// End a sent-off session immediately instead of waiting for the whistle.
    pub async fn end_after_red_card(&self, session: &mut QuizSession) -> bool {
        let ended = session.end_after_red_card(self.clock.now());
        if ended {
            self.finalize_if_complete(session).await;
        }
        ended
    }

    /// Merge the finished session into cumulative stats, at most once.
    ///
    /// Returns true if this call performed the merge attempt.
    pub async fn finalize_if_complete(&self, session: &mut QuizSession) -> bool {
        if !session.is_complete() || !session.mark_stats_recorded() {
            return false;
        }

        let summary = match session.summary() {
            Ok(summary) => summary,
            Err(err) => {
                warn!(session_id = %session.id(), error = %err, "could not summarize session");
                return true;
            }
        };

        info!(
            session_id = %session.id(),
            user_id = %session.user(),
            score = summary.score(),
            correct = summary.correct_answers(),
            red_card = summary.red_card(),
            "session complete"
        );

        let request = session.request();
        if let Err(err) = self
            .stats
            .record_session(session.user(), &request.category, &request.subcategory, &summary)
            .await
        {
            warn!(
                session_id = %session.id(),
                user_id = %session.user(),
                error = %err,
                "stats merge failed"
            );
        }
        true
    }

    async fn record_sighting(&self, session: &QuizSession, result: &QuestionResult) {
        if let Err(err) = self
            .collection
            .record_answer(
                session.user(),
                &result.question_id,
                session.collection_subcategory(&result.question_id),
                result.outcome.mark(),
                self.clock.now(),
            )
            .await
        {
            warn!(
                session_id = %session.id(),
                question_id = %result.question_id,
                error = %err,
                "collection update failed"
            );
        }
    }

    fn log_started(session: &QuizSession) {
        let request = session.request();
        info!(
            session_id = %session.id(),
            user_id = %session.user(),
            category = %request.category,
            subcategory = %request.subcategory,
            mode = %session.quiz().mode(),
            questions = session.quiz().len(),
            "session started"
        );
    }
}
