pub mod catalog;
mod collection;
mod ids;
mod question;
mod session;
mod stats;

pub use catalog::{SubcategoryFilter, collection_subcategory, effective_subcategory};
pub use collection::{AnswerMark, CollectionEntry};
pub use ids::{QuestionId, SessionId, UserId};
pub use question::{Difficulty, DifficultyMode, ParseModeError, Question, QuestionError};
pub use session::{SessionSummary, SessionSummaryError};
pub use stats::{
    CategoryStats, CategoryStatsDelta, CumulativeStats, ScoreDistribution, StatsDelta, percentage,
};
