use std::time::Duration;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("tick interval must be > 0")]
    InvalidTickInterval,

    #[error("time budget must hold at least one tick")]
    InvalidTimeBudget,

    #[error("question counts must be > 0")]
    InvalidQuestionCount,

    #[error("yellow threshold must be > 0 and below the red threshold")]
    InvalidCardThresholds,

    #[error("scoring floor must not exceed the maximum award")]
    InvalidScoreFloor,

    #[error("scoring decay window must be > 0 ticks")]
    InvalidDecayWindow,
}

//
// ─── SCORING RULES ─────────────────────────────────────────────────────────────
//

/// Linear decay from `max_points` down by `decay_points` over `decay_ticks`,
/// never below `floor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRules {
    pub max_points: u32,
    pub decay_points: u32,
    pub decay_ticks: u32,
    pub floor: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            max_points: 1000,
            decay_points: 700,
            decay_ticks: 150,
            floor: 300,
        }
    }
}

//
// ─── QUIZ SETTINGS ─────────────────────────────────────────────────────────────
//

/// Gameplay constants for one quiz session.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSettings {
    time_budget: Duration,
    tick_interval: Duration,
    picks_per_half: usize,
    questions_per_quiz: usize,
    yellow_threshold: u32,
    red_threshold: u32,
    red_card_delay: Duration,
    overlay_duration: Duration,
    scoring: ScoringRules,
}

impl Default for QuizSettings {
    /// 15 s per question at 0.1 s ticks, 5 + 5 picks in default mode,
    /// 10 questions in easy/hard mode, yellow at 3 wrong, red at 6.
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(15),
            tick_interval: Duration::from_millis(100),
            picks_per_half: 5,
            questions_per_quiz: 10,
            yellow_threshold: 3,
            red_threshold: 6,
            red_card_delay: Duration::from_millis(1500),
            overlay_duration: Duration::from_millis(2000),
            scoring: ScoringRules::default(),
        }
    }
}

impl QuizSettings {
    /// Creates custom quiz settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the tick interval is zero, the budget holds
    /// no full tick, a question count is zero, the card thresholds are not
    /// strictly increasing from 1, or the scoring rules are inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        time_budget: Duration,
        tick_interval: Duration,
        picks_per_half: usize,
        questions_per_quiz: usize,
        yellow_threshold: u32,
        red_threshold: u32,
        red_card_delay: Duration,
        overlay_duration: Duration,
        scoring: ScoringRules,
    ) -> Result<Self, SettingsError> {
        if tick_interval.is_zero() {
            return Err(SettingsError::InvalidTickInterval);
        }
        if time_budget < tick_interval {
            return Err(SettingsError::InvalidTimeBudget);
        }
        if picks_per_half == 0 || questions_per_quiz == 0 {
            return Err(SettingsError::InvalidQuestionCount);
        }
        if yellow_threshold == 0 || yellow_threshold >= red_threshold {
            return Err(SettingsError::InvalidCardThresholds);
        }
        if scoring.floor > scoring.max_points {
            return Err(SettingsError::InvalidScoreFloor);
        }
        if scoring.decay_ticks == 0 {
            return Err(SettingsError::InvalidDecayWindow);
        }

        Ok(Self {
            time_budget,
            tick_interval,
            picks_per_half,
            questions_per_quiz,
            yellow_threshold,
            red_threshold,
            red_card_delay,
            overlay_duration,
            scoring,
        })
    }

    #[must_use]
    pub fn time_budget(&self) -> Duration {
        self.time_budget
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Whole ticks that fit in the time budget (150 by default).
    #[must_use]
    pub fn budget_ticks(&self) -> u32 {
        let ticks = self.time_budget.as_nanos() / self.tick_interval.as_nanos();
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn picks_per_half(&self) -> usize {
        self.picks_per_half
    }

    #[must_use]
    pub fn questions_per_quiz(&self) -> usize {
        self.questions_per_quiz
    }

    #[must_use]
    pub fn yellow_threshold(&self) -> u32 {
        self.yellow_threshold
    }

    #[must_use]
    pub fn red_threshold(&self) -> u32 {
        self.red_threshold
    }

    #[must_use]
    pub fn red_card_delay(&self) -> Duration {
        self.red_card_delay
    }

    #[must_use]
    pub fn overlay_duration(&self) -> Duration {
        self.overlay_duration
    }

    #[must_use]
    pub fn scoring(&self) -> ScoringRules {
        self.scoring
    }
}
