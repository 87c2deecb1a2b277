use thiserror::Error;

use crate::model::{ParseModeError, QuestionError, SessionSummaryError};
use crate::settings::SettingsError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Mode(#[from] ParseModeError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}
