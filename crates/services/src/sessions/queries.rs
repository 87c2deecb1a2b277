use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, warn};

use storage::repository::QuestionRepository;
use trivia_core::QuizSettings;
use trivia_core::model::{Question, UserId};

use super::plan::{QuizRequest, QuizSetBuilder};
use super::service::QuizSession;
use crate::error::SessionError;

/// Storage-backed session queries and builders.
pub(crate) struct SessionQueries;

impl SessionQueries {
    /// Fetch the raw pool for `request`.
    ///
    /// A failing backend is logged and treated as an empty pool, so callers
    /// surface it the same way as a category with no questions.
    pub async fn load_pool(
        questions: &dyn QuestionRepository,
        request: &QuizRequest,
    ) -> Vec<Question> {
        match questions
            .fetch_questions(&request.category, &request.subcategory)
            .await
        {
            Ok(pool) => pool,
            Err(err) => {
                warn!(
                    category = %request.category,
                    subcategory = %request.subcategory,
                    error = %err,
                    "question fetch failed; treating pool as empty"
                );
                Vec::new()
            }
        }
    }

    /// Select a quiz set from an already fetched pool and open a session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` when nothing could be selected.
    pub fn open_session<R: Rng + ?Sized>(
        user: UserId,
        request: QuizRequest,
        settings: &QuizSettings,
        pool: Vec<Question>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        let mode = request.effective_mode();
        if mode != request.mode {
            debug!(
                subcategory = %request.subcategory,
                requested = %request.mode,
                "difficulty modes unavailable; using default mix"
            );
        }

        let quiz = QuizSetBuilder::new(settings, mode).build(pool, rng);
        debug!(
            category = %request.category,
            subcategory = %request.subcategory,
            mode = %mode,
            questions = quiz.len(),
            "quiz set selected"
        );
        QuizSession::new(user, request, settings.clone(), quiz, now)
    }
}
