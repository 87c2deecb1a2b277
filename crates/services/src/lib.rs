#![forbid(unsafe_code)]

pub mod app_services;
pub mod collection_service;
pub mod error;
pub mod sessions;
pub mod stats_service;

pub use trivia_core::Clock;

pub use app_services::AppServices;
pub use collection_service::{
    CollectionDetail, CollectionGroup, CollectionRow, CollectionService, DetailSort, OverviewSort,
    SortOrder, SubcategoryProgress,
};
pub use error::{AppServicesError, CollectionServiceError, SessionError, StatsServiceError};
pub use stats_service::{PerformanceBand, Profile, StatsService};

pub use sessions::{
    CardOverlay, QuestionOutcome, QuestionResult, QuizLoopService, QuizRequest, QuizSession,
    SessionAnswerResult, SessionSignal, SessionView, SignalKind, SignalOutcome, SignalScheduler,
};
