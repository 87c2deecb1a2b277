#![forbid(unsafe_code)]

pub mod discipline;
pub mod error;
pub mod model;
pub mod scoring;
pub mod settings;
pub mod time;
pub mod timer;

pub use error::Error;
pub use settings::{QuizSettings, ScoringRules, SettingsError};
pub use time::Clock;
