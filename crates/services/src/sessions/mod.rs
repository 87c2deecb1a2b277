mod plan;
mod progress;
mod queries;
mod service;
mod signals;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{QuizRequest, QuizSet, QuizSetBuilder};
pub use progress::SessionProgress;
pub use service::{QuestionOutcome, QuestionResult, QuizSession, SignalOutcome};
pub use signals::{SessionSignal, SignalKind, SignalScheduler};
pub use view::{CardOverlay, QuestionView, SessionView, SummaryView};
pub use workflow::{QuizLoopService, SessionAnswerResult};
