use std::sync::Arc;

use storage::repository::{QuestionRepository, Storage};
use trivia_core::QuizSettings;

use crate::Clock;
use crate::collection_service::CollectionService;
use crate::error::AppServicesError;
use crate::sessions::QuizLoopService;
use crate::stats_service::StatsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    questions: Arc<dyn QuestionRepository>,
    quiz_loop: Arc<QuizLoopService>,
    stats: Arc<StatsService>,
    collection: Arc<CollectionService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: QuizSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, settings))
    }

    /// Build services over an already opened storage aggregate.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, settings: QuizSettings) -> Self {
        let stats = StatsService::new(Arc::clone(&storage.stats));
        let collection = CollectionService::new(
            Arc::clone(&storage.questions),
            Arc::clone(&storage.collection),
        );
        let quiz_loop = QuizLoopService::new(
            clock,
            settings,
            Arc::clone(&storage.questions),
            stats.clone(),
            collection.clone(),
        );

        Self {
            questions: Arc::clone(&storage.questions),
            quiz_loop: Arc::new(quiz_loop),
            stats: Arc::new(stats),
            collection: Arc::new(collection),
        }
    }

    /// Raw question store, used for seeding.
    #[must_use]
    pub fn questions(&self) -> Arc<dyn QuestionRepository> {
        Arc::clone(&self.questions)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn stats(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats)
    }

    #[must_use]
    pub fn collection(&self) -> Arc<CollectionService> {
        Arc::clone(&self.collection)
    }
}
