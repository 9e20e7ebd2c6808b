use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time since an arbitrary origin fixed by the clock.
pub trait Clock {
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Real time, measured from when the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual time that only moves when told to. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, to: Duration) {
        self.millis.store(to.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Deadline bookkeeping for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundClock {
    duration: Duration,
    deadline: Duration,
}

impl RoundClock {
    pub fn start(now: Duration, duration_secs: u64) -> Self {
        let duration = Duration::from_secs(duration_secs);
        Self {
            duration,
            deadline: now + duration,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Milliseconds left until the deadline; negative once it has passed.
    pub fn remaining_ms(&self, now: Duration) -> i64 {
        self.deadline.as_millis() as i64 - now.as_millis() as i64
    }

    /// Whole seconds left for display, rounded up.
    pub fn remaining_secs(&self, now: Duration) -> i64 {
        let ms = self.remaining_ms(now);
        // ceil for integer division, correct for negative values too
        ms.div_euclid(1000) + i64::from(ms.rem_euclid(1000) != 0)
    }

    /// The round must stop: every pair found, or time is up.
    pub fn should_end(&self, now: Duration, score: usize, pair_count: usize) -> bool {
        score == pair_count || self.remaining_ms(now) <= 0
    }
}
