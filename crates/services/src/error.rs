//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use trivia_core::model::SessionSummaryError;

/// Errors emitted by quiz sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for this selection")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("session still in progress")]
    InProgress,
    #[error("current question already answered")]
    AlreadyAnswered,
    #[error("current question not answered yet")]
    NotAnswered,
    #[error("player was sent off; session is ending")]
    SentOff,
    #[error("not an option for the current question: {0}")]
    UnknownOption(String),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CollectionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CollectionServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
