//! Owns the one round that may be running, plus everything that outlives it.
//!
//! The controller is driven from a single loop: clicks come in through
//! [`Controller::click`], and [`Controller::pump`] fires whatever timers are
//! due. Clicks and quits fire due timers first, so input is always applied
//! to the round as it stands at the moment it arrives. Each call runs to
//! completion before the next one starts.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::difficulty::Difficulty;
use crate::error::GameError;
use crate::grid::Grid;
use crate::run_log::{ResultRecord, RunLog};
use crate::scheduler::{Scheduler, TimerKind};
use crate::selection::ClickOutcome;
use crate::session::{GameSession, Notice, RoundId, Scene};
use crate::token::{fetch_tokens, Token, TokenSource};

/// Prefix the renderer puts in front of a card's grid position.
pub const POSITION_TAG_PREFIX: &str = "cardIndex-";

/// Turn a renderer tag such as `cardIndex-7` into a grid position.
pub fn parse_position_tag(tag: &str) -> Result<usize, GameError> {
    tag.strip_prefix(POSITION_TAG_PREFIX)
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| GameError::MalformedPosition(tag.to_string()))
}

/// Timing and logging policy shared by every round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSettings {
    pub tick_every: Duration,
    pub mismatch_delay: Duration,
    /// Log rounds the player walks away from, using the score and time at that moment.
    pub record_quit_rounds: bool,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            tick_every: Duration::from_secs(1),
            mismatch_delay: Duration::from_secs(1),
            record_quit_rounds: true,
        }
    }
}

#[derive(Debug)]
pub struct Controller<C: Clock> {
    clock: C,
    settings: RoundSettings,
    scheduler: Scheduler,
    session: Option<GameSession>,
    next_round: RoundId,
    log: RunLog,
    notices: Vec<Notice>,
}

impl<C: Clock> Controller<C> {
    pub fn new(clock: C, settings: RoundSettings) -> Self {
        Self {
            clock,
            settings,
            scheduler: Scheduler::new(),
            session: None,
            next_round: RoundId::new(0),
            log: RunLog::new(),
            notices: Vec::new(),
        }
    }

    /// Fetch tokens for `difficulty` and start a round over them.
    ///
    /// Nothing changes if the fetch fails: no session, no timers, no scene change.
    pub fn start_round<S, R>(
        &mut self,
        difficulty: Difficulty,
        source: &S,
        ids: RangeInclusive<u32>,
        rng: &mut R,
    ) -> Result<RoundId, GameError>
    where
        S: TokenSource + ?Sized,
        R: Rng + ?Sized,
    {
        if self.is_active() {
            return Err(GameError::RoundInProgress);
        }
        let preset = difficulty.preset();
        let tokens = fetch_tokens(source, preset.pair_count, *ids.start(), *ids.end(), rng)?;
        let grid = Grid::generate(tokens.len(), rng);
        self.begin_round(tokens, grid, preset.label, preset.duration_secs)
    }

    /// Start a round over tokens that are already in hand.
    pub fn begin_round(
        &mut self,
        tokens: Vec<Token>,
        grid: Grid,
        difficulty: &str,
        duration_secs: u64,
    ) -> Result<RoundId, GameError> {
        if self.is_active() {
            return Err(GameError::RoundInProgress);
        }
        if !grid.pairs_up(tokens.len()) {
            return Err(GameError::BoardMismatch {
                cells: grid.len(),
                tokens: tokens.len(),
            });
        }
        let id = self.next_round;
        self.next_round = id.next();

        let mut session = GameSession::with_grid(id, tokens, grid, difficulty, duration_secs);
        session.start(self.clock.now(), self.settings.tick_every, &mut self.scheduler);
        self.notices.extend(session.take_notices());
        self.notices.push(Notice::SceneChanged(Scene::Active));
        self.session = Some(session);
        Ok(id)
    }

    /// A card at `pos` was clicked. Positions off the board are ignored.
    ///
    /// Timers due by now fire first. A click that lands after the deadline
    /// finds the round already over and gets [`GameError::NoActiveRound`].
    pub fn click(&mut self, pos: usize) -> Result<ClickOutcome, GameError> {
        let now = self.clock.now();
        self.fire_due(now);
        let session = self.session.as_mut().ok_or(GameError::NoActiveRound)?;
        let outcome = session.click(pos, now, self.settings.mismatch_delay, &mut self.scheduler);
        self.notices.extend(session.take_notices());

        // Finishing the last pair ends the round without waiting for the next tick.
        if matches!(outcome, ClickOutcome::Matched { .. }) && session.is_complete() {
            self.end_round(now);
        }
        Ok(outcome)
    }

    /// Like [`Controller::click`], for clicks reported by renderer tag.
    pub fn click_tag(&mut self, tag: &str) -> Result<ClickOutcome, GameError> {
        let pos = parse_position_tag(tag)?;
        self.click(pos)
    }

    /// Fire every timer that is due by now, each at its own due time.
    /// Returns the result if the round ended along the way.
    pub fn pump(&mut self) -> Option<ResultRecord> {
        let now = self.clock.now();
        self.fire_due(now)
    }

    fn fire_due(&mut self, now: Duration) -> Option<ResultRecord> {
        let mut ended = None;

        while let Some(fired) = self.scheduler.pop_due(now) {
            match fired.kind {
                TimerKind::RoundTick => {
                    let should_end = self.session.as_ref().is_some_and(|s| s.tick(fired.at));
                    if should_end {
                        ended = self.end_round(fired.at);
                    }
                }
                TimerKind::ResolveMismatch(round) => match self.session.as_mut() {
                    Some(session) if session.id() == round => {
                        session.resolve_mismatch();
                        self.notices.extend(session.take_notices());
                    }
                    _ => debug!(?round, "stale mismatch timer ignored"),
                },
            }
        }
        ended
    }

    /// Leave the running round early. Returns its record when quits are logged.
    /// A round whose deadline has already passed ends as a timeout instead.
    pub fn quit(&mut self) -> Result<Option<ResultRecord>, GameError> {
        let now = self.clock.now();
        self.fire_due(now);
        if !self.is_active() {
            return Err(GameError::NoActiveRound);
        }
        info!("round quit");

        if self.settings.record_quit_rounds {
            return Ok(self.end_round(now));
        }
        if let Some(mut session) = self.session.take() {
            session.finish(now, &mut self.scheduler);
        }
        self.notices.push(Notice::SceneChanged(Scene::Inactive));
        Ok(None)
    }

    fn end_round(&mut self, now: Duration) -> Option<ResultRecord> {
        let mut session = self.session.take()?;
        let record = session.finish(now, &mut self.scheduler);
        self.notices.extend(session.take_notices());
        self.log.push(record.clone());
        self.notices.push(Notice::SceneChanged(Scene::Inactive));
        Some(record)
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn scene(&self) -> Scene {
        if self.is_active() {
            Scene::Active
        } else {
            Scene::Inactive
        }
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn run_log(&self) -> &RunLog {
        &self.log
    }

    pub fn settings(&self) -> &RoundSettings {
        &self.settings
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// When the next timer is due, so an idle loop knows how long it may sleep.
    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
