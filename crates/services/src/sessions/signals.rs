use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use trivia_core::QuizSettings;
use trivia_core::discipline::CardEvent;
use trivia_core::model::SessionId;

use super::view::CardOverlay;

/// What a timed callback asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// One countdown tick.
    Tick,
    /// Hide the card overlay, if it is still the one that was shown.
    HideOverlay(CardOverlay),
    /// End the session after a red card.
    RedCardWhistle,
}

/// A timed callback, tagged with the session that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSignal {
    pub session: SessionId,
    pub kind: SignalKind,
}

/// Owns every timer task for one session.
///
/// Signals arrive on the receiver returned by [`SignalScheduler::new`].
/// Cancelling (or dropping) the scheduler stops the ticker and discards every
/// pending delayed signal. Signals already queued carry the old session id and
/// are ignored by newer sessions.
#[derive(Debug)]
pub struct SignalScheduler {
    session: SessionId,
    cancel: CancellationToken,
    tx: UnboundedSender<SessionSignal>,
}

impl SignalScheduler {
    #[must_use]
    pub fn new(session: SessionId) -> (Self, UnboundedReceiver<SessionSignal>) {
        let (tx, rx) = unbounded_channel();
        let scheduler = Self {
            session,
            cancel: CancellationToken::new(),
            tx,
        };
        (scheduler, rx)
    }

    #[must_use]
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Emit a `Tick` every `period` until cancelled. The first tick fires one
    /// full period after the call.
    pub fn start_ticker(&self, period: Duration) {
        let cancel = self.cancel.clone();
        let tx = self.tx.clone();
        let signal = SessionSignal {
            session: self.session,
            kind: SignalKind::Tick,
        };

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        debug!(session = %signal.session, "ticker cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        if tx.send(signal).is_err() {
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Deliver `kind` once after `delay`, unless cancelled first.
    pub fn schedule(&self, delay: Duration, kind: SignalKind) {
        let cancel = self.cancel.clone();
        let tx = self.tx.clone();
        let signal = SessionSignal {
            session: self.session,
            kind,
        };

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = sleep(delay) => {
                    let _ = tx.send(signal);
                }
            }
        });
    }

    /// Schedule the overlay hide and, for a red card, the closing whistle.
    pub fn schedule_card_follow_ups(&self, cards: &[CardEvent], settings: &QuizSettings) {
        for card in cards {
            self.schedule(
                settings.overlay_duration(),
                SignalKind::HideOverlay(CardOverlay::for_card(card)),
            );
            if matches!(card, CardEvent::Red(_)) {
                self.schedule(settings.red_card_delay(), SignalKind::RedCardWhistle);
            }
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for SignalScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticker_emits_tagged_ticks() {
        let session = SessionId::generate();
        let (scheduler, mut rx) = SignalScheduler::new(session);
        scheduler.start_ticker(Duration::from_millis(100));

        for _ in 0..3 {
            let signal = rx.recv().await.unwrap();
            assert_eq!(signal.session, session);
            assert_eq!(signal.kind, SignalKind::Tick);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_signal_arrives_after_delay() {
        let session = SessionId::generate();
        let (scheduler, mut rx) = SignalScheduler::new(session);
        let started = tokio::time::Instant::now();
        scheduler.schedule(Duration::from_millis(1500), SignalKind::RedCardWhistle);

        let signal = rx.recv().await.unwrap();
        assert_eq!(signal.kind, SignalKind::RedCardWhistle);
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_signals() {
        let session = SessionId::generate();
        let (scheduler, mut rx) = SignalScheduler::new(session);
        scheduler.schedule(
            Duration::from_millis(500),
            SignalKind::HideOverlay(CardOverlay::Yellow),
        );
        scheduler.start_ticker(Duration::from_millis(100));
        scheduler.cancel();
        assert!(scheduler.is_cancelled());

        drop(scheduler);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn red_card_schedules_overlay_and_whistle() {
        let session = SessionId::generate();
        let settings = QuizSettings::default();
        let (scheduler, mut rx) = SignalScheduler::new(session);
        scheduler.schedule_card_follow_ups(
            &[CardEvent::Red(trivia_core::discipline::RedCardCause::SecondYellow)],
            &settings,
        );

        assert_eq!(rx.recv().await.unwrap().kind, SignalKind::RedCardWhistle);
        assert_eq!(
            rx.recv().await.unwrap().kind,
            SignalKind::HideOverlay(CardOverlay::Red)
        );
    }
}
