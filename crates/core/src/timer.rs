use std::time::Duration;

use crate::settings::QuizSettings;

/// Result of feeding one tick to a [`CountdownTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is stopped or the question is already answered.
    Inert,
    /// Time moved on; `remaining_ticks` is still above zero.
    Running { remaining_ticks: u32 },
    /// The budget ran out on this tick. The timer has stopped itself.
    Expired,
}

/// Per-question countdown.
///
/// Two counters are kept on purpose: `elapsed_ticks` counts callbacks and feeds
/// scoring, `remaining_ticks` drives the visible clock. Remaining time is held
/// in whole ticks so repeated decrements never drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTimer {
    budget_ticks: u32,
    tick_interval: Duration,
    remaining_ticks: u32,
    elapsed_ticks: u32,
    active: bool,
}

impl CountdownTimer {
    #[must_use]
    pub fn new(budget_ticks: u32, tick_interval: Duration) -> Self {
        Self {
            budget_ticks,
            tick_interval,
            remaining_ticks: budget_ticks,
            elapsed_ticks: 0,
            active: true,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &QuizSettings) -> Self {
        Self::new(settings.budget_ticks(), settings.tick_interval())
    }

    /// Full budget, zero elapsed, ticking again. Called for every new question.
    pub fn restart(&mut self) {
        self.remaining_ticks = self.budget_ticks;
        self.elapsed_ticks = 0;
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Advance by one tick unless the timer is stopped or `answered` is set.
    pub fn tick(&mut self, answered: bool) -> TickOutcome {
        if !self.active || answered {
            return TickOutcome::Inert;
        }

        self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);
        if self.remaining_ticks <= 1 {
            self.remaining_ticks = 0;
            self.active = false;
            return TickOutcome::Expired;
        }

        self.remaining_ticks -= 1;
        TickOutcome::Running {
            remaining_ticks: self.remaining_ticks,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_ticks == 0
    }

    #[must_use]
    pub fn elapsed_ticks(&self) -> u32 {
        self.elapsed_ticks
    }

    #[must_use]
    pub fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }

    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.tick_interval * self.remaining_ticks
    }

    /// Remaining time in seconds, for display.
    #[must_use]
    pub fn remaining_secs(&self) -> f64 {
        self.remaining().as_secs_f64()
    }

    /// Fraction of the budget left, in `[0, 1]`.
    #[must_use]
    pub fn remaining_fraction(&self) -> f64 {
        if self.budget_ticks == 0 {
            return 0.0;
        }
        f64::from(self.remaining_ticks) / f64::from(self.budget_ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> CountdownTimer {
        CountdownTimer::from_settings(&QuizSettings::default())
    }

    #[test]
    fn counts_down_one_tick_at_a_time() {
        let mut t = timer();
        assert_eq!(
            t.tick(false),
            TickOutcome::Running {
                remaining_ticks: 149
            }
        );
        assert_eq!(t.elapsed_ticks(), 1);
        assert!((t.remaining_secs() - 14.9).abs() < 1e-9);
    }

    #[test]
    fn expires_on_the_budget_tick() {
        let mut t = timer();
        for _ in 0..149 {
            assert!(matches!(t.tick(false), TickOutcome::Running { .. }));
        }
        assert_eq!(t.remaining_ticks(), 1);
        assert_eq!(t.tick(false), TickOutcome::Expired);
        assert_eq!(t.elapsed_ticks(), 150);
        assert!(t.is_expired());
        assert!(!t.is_active());
        assert_eq!(t.tick(false), TickOutcome::Inert);
    }

    #[test]
    fn answered_question_does_not_tick() {
        let mut t = timer();
        assert_eq!(t.tick(true), TickOutcome::Inert);
        assert_eq!(t.elapsed_ticks(), 0);
        assert_eq!(t.remaining_ticks(), 150);
    }

    #[test]
    fn restart_resets_both_counters() {
        let mut t = timer();
        for _ in 0..20 {
            t.tick(false);
        }
        t.stop();
        t.restart();
        assert_eq!(t.elapsed_ticks(), 0);
        assert_eq!(t.remaining_ticks(), 150);
        assert!(t.is_active());
    }
}
