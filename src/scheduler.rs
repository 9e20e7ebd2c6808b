//! Timer queue for the single-threaded game loop.
//!
//! Nothing here sleeps or spawns: callers ask for the timers that are due at
//! some instant and handle them one at a time, each at its own due time. That
//! keeps the round logic deterministic under a [`crate::clock::ManualClock`].

use std::time::Duration;

use crate::session::RoundId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Periodic round clock tick.
    RoundTick,
    /// Flip a mismatched pair back over. Carries the round that scheduled it.
    ResolveMismatch(RoundId),
}

/// A timer that came due, stamped with the instant it was due at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    pub at: Duration,
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
    kind: TimerKind,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, due: Duration, kind: TimerKind) -> TimerId {
        self.push(due, None, kind)
    }

    /// Fire first at `start + period`, then every `period` until cancelled.
    pub fn schedule_every(&mut self, start: Duration, period: Duration, kind: TimerKind) -> TimerId {
        self.push(start + period, Some(period), kind)
    }

    /// Returns false when the timer had already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// Take the earliest timer due at or before `now`. Ties go to the timer
    /// scheduled first. Periodic timers are re-armed for their next period.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;

        let fired = Fired {
            id: self.timers[idx].id,
            kind: self.timers[idx].kind,
            at: self.timers[idx].due,
        };

        match self.timers[idx].period {
            Some(period) => self.timers[idx].due += period,
            None => {
                self.timers.swap_remove(idx);
            }
        }

        Some(fired)
    }

    fn push(&mut self, due: Duration, period: Option<Duration>, kind: TimerKind) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due,
            period,
            kind,
        });
        id
    }
}
