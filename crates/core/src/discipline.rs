//! Yellow/red card bookkeeping driven by runs of wrong answers.
//!
//! Pure: [`Discipline::transition`] takes the current state and one outcome and
//! returns the next state plus the card events to show.

use crate::settings::QuizSettings;

/// What the player's pick did, from the referee's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedCardCause {
    /// A second run reached the yellow threshold after a yellow was booked.
    SecondYellow,
    /// One unbroken run reached the red threshold.
    ConsecutiveWrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisciplineState {
    Clean,
    OneYellow,
    SessionEnded { cause: RedCardCause },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEvent {
    Yellow,
    Red(RedCardCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardThresholds {
    pub yellow: u32,
    pub red: u32,
}

impl CardThresholds {
    #[must_use]
    pub fn from_settings(settings: &QuizSettings) -> Self {
        Self {
            yellow: settings.yellow_threshold(),
            red: settings.red_threshold(),
        }
    }
}

impl Default for CardThresholds {
    fn default() -> Self {
        Self { yellow: 3, red: 6 }
    }
}

/// Wrong-run counters plus the booking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discipline {
    state: DisciplineState,
    wrong_streak: u32,
    longest_wrong_streak: u32,
    yellow_cards: u32,
}

impl Default for Discipline {
    fn default() -> Self {
        Self::new()
    }
}

impl Discipline {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DisciplineState::Clean,
            wrong_streak: 0,
            longest_wrong_streak: 0,
            yellow_cards: 0,
        }
    }

    /// Apply one answer outcome.
    ///
    /// Once the session has ended on a red card every further outcome is a
    /// no-op, so a red card is issued at most once.
    #[must_use]
    pub fn transition(
        self,
        outcome: AnswerOutcome,
        thresholds: CardThresholds,
    ) -> (Self, Vec<CardEvent>) {
        if self.is_sent_off() {
            return (self, Vec::new());
        }

        let mut next = self;
        match outcome {
            AnswerOutcome::Correct => {
                next.wrong_streak = 0;
                (next, Vec::new())
            }
            AnswerOutcome::Wrong => {
                next.wrong_streak = next.wrong_streak.saturating_add(1);
                next.longest_wrong_streak = next.longest_wrong_streak.max(next.wrong_streak);

                if next.wrong_streak == thresholds.red {
                    let cause = RedCardCause::ConsecutiveWrong;
                    next.state = DisciplineState::SessionEnded { cause };
                    return (next, vec![CardEvent::Red(cause)]);
                }

                if next.wrong_streak == thresholds.yellow {
                    return match next.state {
                        DisciplineState::Clean => {
                            next.state = DisciplineState::OneYellow;
                            next.yellow_cards = 1;
                            (next, vec![CardEvent::Yellow])
                        }
                        DisciplineState::OneYellow => {
                            let cause = RedCardCause::SecondYellow;
                            next.state = DisciplineState::SessionEnded { cause };
                            (next, vec![CardEvent::Red(cause)])
                        }
                        DisciplineState::SessionEnded { .. } => (next, Vec::new()),
                    };
                }

                (next, Vec::new())
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> DisciplineState {
        self.state
    }

    #[must_use]
    pub fn wrong_streak(&self) -> u32 {
        self.wrong_streak
    }

    #[must_use]
    pub fn longest_wrong_streak(&self) -> u32 {
        self.longest_wrong_streak
    }

    /// Yellow cards booked this session, 0 or 1.
    #[must_use]
    pub fn yellow_cards(&self) -> u32 {
        self.yellow_cards
    }

    #[must_use]
    pub fn is_sent_off(&self) -> bool {
        matches!(self.state, DisciplineState::SessionEnded { .. })
    }

    /// The persistent "1st yellow" badge: shown once booked, replaced by a red.
    #[must_use]
    pub fn shows_yellow_badge(&self) -> bool {
        matches!(self.state, DisciplineState::OneYellow)
    }
}
