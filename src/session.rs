use std::time::Duration;

use chrono::Local;
use rand::Rng;
use tracing::{debug, info};

use crate::clock::RoundClock;
use crate::grid::{Grid, TokenIndex};
use crate::run_log::ResultRecord;
use crate::scheduler::{Scheduler, TimerId, TimerKind};
use crate::selection::{ClickOutcome, IgnoreReason, SelectionMachine, SelectionState};
use crate::token::Token;

/// Identifies one round across its lifetime, so late timers can tell they are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundId(u64);

impl RoundId {
    pub fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    NotStarted,
    Running,
    Ended,
}

/// Whether a round is on screen. The front end switches screens on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Active,
    Inactive,
}

/// How one card should be drawn when the board is first laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub position: usize,
    pub token: Option<TokenIndex>,
    pub face_up: bool,
}

/// Everything the renderer needs to hear about, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    BoardReady(Vec<CellView>),
    Reveal(usize),
    Hide(usize),
    /// The card at this position was matched and is out of play.
    Cleared(usize),
    SceneChanged(Scene),
}

/// One round: the board, its tokens, and the running score.
#[derive(Debug)]
pub struct GameSession {
    id: RoundId,
    grid: Grid,
    tokens: Vec<Token>,
    difficulty: String,
    clock: RoundClock,
    score: usize,
    clicks: usize,
    selection: SelectionMachine,
    phase: RoundPhase,
    tick_timer: Option<TimerId>,
    resolve_timer: Option<TimerId>,
    outbox: Vec<Notice>,
}

impl GameSession {
    /// A round over `tokens` with a freshly shuffled board.
    pub fn generate<R: Rng + ?Sized>(
        id: RoundId,
        tokens: Vec<Token>,
        difficulty: impl Into<String>,
        duration_secs: u64,
        rng: &mut R,
    ) -> Self {
        let grid = Grid::generate(tokens.len(), rng);
        Self::with_grid(id, tokens, grid, difficulty, duration_secs)
    }

    /// A round over a board laid out in advance.
    pub fn with_grid(
        id: RoundId,
        tokens: Vec<Token>,
        grid: Grid,
        difficulty: impl Into<String>,
        duration_secs: u64,
    ) -> Self {
        debug_assert!(grid.pairs_up(tokens.len()));
        Self {
            id,
            grid,
            tokens,
            difficulty: difficulty.into(),
            clock: RoundClock::start(Duration::ZERO, duration_secs),
            score: 0,
            clicks: 0,
            selection: SelectionMachine::new(),
            phase: RoundPhase::NotStarted,
            tick_timer: None,
            resolve_timer: None,
            outbox: Vec::new(),
        }
    }

    /// Reset the counters, arm the round clock and lay out the board.
    pub fn start(&mut self, now: Duration, tick_every: Duration, scheduler: &mut Scheduler) {
        self.score = 0;
        self.clicks = 0;
        self.clock = RoundClock::start(now, self.clock.duration().as_secs());
        self.tick_timer = Some(scheduler.schedule_every(now, tick_every, TimerKind::RoundTick));
        self.phase = RoundPhase::Running;

        let cells = self
            .grid
            .cells()
            .iter()
            .enumerate()
            .map(|(position, token)| CellView {
                position,
                token: *token,
                face_up: false,
            })
            .collect();
        self.outbox.push(Notice::BoardReady(cells));

        info!(
            round = self.id.0,
            difficulty = %self.difficulty,
            pairs = self.pair_count(),
            duration_secs = self.clock.duration().as_secs(),
            "round started"
        );
    }

    /// Handle a click on `pos`, scheduling the flip-back if it made a mismatch.
    pub fn click(
        &mut self,
        pos: usize,
        now: Duration,
        mismatch_delay: Duration,
        scheduler: &mut Scheduler,
    ) -> ClickOutcome {
        if self.phase != RoundPhase::Running {
            return ClickOutcome::Ignored(IgnoreReason::Locked);
        }

        let outcome = self.selection.on_card_clicked(pos, &mut self.grid);
        if outcome.is_accepted() {
            self.clicks += 1;
        }

        match outcome {
            ClickOutcome::Ignored(reason) => {
                debug!(round = self.id.0, pos, ?reason, "click ignored");
            }
            ClickOutcome::Selected(p) => self.outbox.push(Notice::Reveal(p)),
            ClickOutcome::Deselected(p) => self.outbox.push(Notice::Hide(p)),
            ClickOutcome::Matched { first, second, token } => {
                self.score += 1;
                self.outbox.push(Notice::Reveal(second));
                self.outbox.push(Notice::Cleared(first));
                self.outbox.push(Notice::Cleared(second));
                debug!(round = self.id.0, first, second, token, score = self.score, "pair matched");
            }
            ClickOutcome::Mismatched { first, second } => {
                self.outbox.push(Notice::Reveal(second));
                self.resolve_timer = Some(
                    scheduler.schedule_once(now + mismatch_delay, TimerKind::ResolveMismatch(self.id)),
                );
                debug!(round = self.id.0, first, second, "pair mismatched");
            }
        }
        outcome
    }

    /// The mismatch delay ran out: turn both cards back over and unlock input.
    pub fn resolve_mismatch(&mut self) {
        self.resolve_timer = None;
        if let Some((first, second)) = self.selection.resolve() {
            self.outbox.push(Notice::Hide(first));
            self.outbox.push(Notice::Hide(second));
        }
    }

    /// Periodic check; true when the round has to end now.
    pub fn tick(&self, now: Duration) -> bool {
        self.phase == RoundPhase::Running
            && self.clock.should_end(now, self.score, self.pair_count())
    }

    /// Stop the round and write up the result. Cancels every timer it owns.
    pub fn finish(&mut self, now: Duration, scheduler: &mut Scheduler) -> ResultRecord {
        for timer in [self.tick_timer.take(), self.resolve_timer.take()].into_iter().flatten() {
            scheduler.cancel(timer);
        }
        self.phase = RoundPhase::Ended;

        let record = ResultRecord {
            won: self.is_complete(),
            duration_secs: self.clock.duration().as_secs(),
            pair_count: self.pair_count(),
            difficulty: self.difficulty.clone(),
            seconds_remaining: self.remaining_secs(now).max(0) as u64,
            completed_at: Local::now(),
        };
        info!(
            round = self.id.0,
            won = record.won,
            seconds_remaining = record.seconds_remaining,
            clicks = self.clicks,
            "round ended"
        );
        record
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.outbox)
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: TokenIndex) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn clicks(&self) -> usize {
        self.clicks
    }

    pub fn pair_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.state()
    }

    pub fn is_complete(&self) -> bool {
        self.score == self.pair_count()
    }

    pub fn remaining_secs(&self, now: Duration) -> i64 {
        self.clock.remaining_secs(now)
    }

    pub fn status_line(&self) -> String {
        format!(
            "{}/{} pairs to match | Clicked {} times",
            self.score,
            self.pair_count(),
            self.clicks
        )
    }

    pub fn timer_line(&self, now: Duration) -> String {
        format!("{} seconds left", self.remaining_secs(now).max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(1);

    fn tokens(n: usize) -> Vec<Token> {
        (0..n)
            .map(|i| Token {
                image: format!("img/{i}.png"),
                name: format!("token{i}"),
                id: i as u32 + 1,
            })
            .collect()
    }

    fn started(layout: Vec<usize>, duration_secs: u64) -> (GameSession, Scheduler) {
        let pairs = layout.len() / 2;
        let mut session = GameSession::with_grid(
            RoundId::new(1),
            tokens(pairs),
            Grid::from_layout(layout),
            "Easy",
            duration_secs,
        );
        let mut scheduler = Scheduler::new();
        session.start(Duration::ZERO, Duration::from_secs(1), &mut scheduler);
        (session, scheduler)
    }

    #[test]
    fn test_start_lays_out_face_down_board() {
        let (mut session, scheduler) = started(vec![1, 0, 0, 1], 30);

        assert_eq!(session.phase(), RoundPhase::Running);
        assert_eq!(scheduler.pending(), 1);

        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        match &notices[0] {
            Notice::BoardReady(cells) => {
                assert_eq!(cells.len(), 4);
                assert!(cells.iter().all(|c| !c.face_up));
                assert_eq!(cells[0].token, Some(1));
            }
            other => panic!("expected BoardReady, got {other:?}"),
        }
    }

    #[test]
    fn test_click_counting() {
        let (mut session, mut scheduler) = started(vec![0, 1, 1, 0], 30);
        let now = Duration::from_millis(100);

        session.click(0, now, DELAY, &mut scheduler);
        session.click(1, now, DELAY, &mut scheduler);
        assert_eq!(session.clicks(), 2);

        // Locked while the mismatch is showing.
        assert_eq!(
            session.click(2, now, DELAY, &mut scheduler),
            ClickOutcome::Ignored(IgnoreReason::Locked)
        );
        assert_eq!(session.clicks(), 2);
        assert_eq!(session.score(), 0);
        assert_eq!(scheduler.pending(), 2);
    }

    #[test]
    fn test_match_scores_and_notifies() {
        let (mut session, mut scheduler) = started(vec![1, 0, 0, 1], 30);
        session.take_notices();

        session.click(0, Duration::ZERO, DELAY, &mut scheduler);
        session.click(3, Duration::ZERO, DELAY, &mut scheduler);

        assert_eq!(session.score(), 1);
        assert_eq!(
            session.take_notices(),
            vec![
                Notice::Reveal(0),
                Notice::Reveal(3),
                Notice::Cleared(0),
                Notice::Cleared(3)
            ]
        );
        assert_eq!(session.status_line(), "1/2 pairs to match | Clicked 2 times");
    }

    #[test]
    fn test_resolve_mismatch_hides_both() {
        let (mut session, mut scheduler) = started(vec![1, 0, 0, 1], 30);
        session.click(0, Duration::ZERO, DELAY, &mut scheduler);
        session.click(1, Duration::ZERO, DELAY, &mut scheduler);
        session.take_notices();

        session.resolve_mismatch();

        assert_eq!(session.take_notices(), vec![Notice::Hide(0), Notice::Hide(1)]);
        assert_eq!(session.selection(), SelectionState::Empty);
    }

    #[test]
    fn test_finish_cancels_timers_and_reports() {
        let (mut session, mut scheduler) = started(vec![0, 1, 0, 1], 30);
        session.click(0, Duration::ZERO, DELAY, &mut scheduler);
        session.click(1, Duration::ZERO, DELAY, &mut scheduler);
        assert_eq!(scheduler.pending(), 2);

        let record = session.finish(Duration::from_millis(20_500), &mut scheduler);

        assert_eq!(scheduler.pending(), 0);
        assert_eq!(session.phase(), RoundPhase::Ended);
        assert!(!record.won);
        assert_eq!(record.seconds_remaining, 10);
        assert_eq!(record.pair_count, 2);
        assert_eq!(record.duration_secs, 30);
        assert_eq!(record.difficulty, "Easy");
    }

    #[test]
    fn test_tick_detects_timeout() {
        let (session, _scheduler) = started(vec![0, 0], 30);

        assert!(!session.tick(Duration::from_secs(29)));
        assert!(session.tick(Duration::from_secs(30)));
        assert_eq!(session.timer_line(Duration::from_secs(31)), "0 seconds left");
    }

    #[test]
    fn test_clicks_after_finish_ignored() {
        let (mut session, mut scheduler) = started(vec![0, 0], 30);
        session.finish(Duration::from_secs(1), &mut scheduler);

        let outcome = session.click(0, Duration::from_secs(2), DELAY, &mut scheduler);
        assert!(!outcome.is_accepted());
        assert_eq!(session.clicks(), 0);
    }

    #[test]
    fn test_generate_builds_matching_grid() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let session = GameSession::generate(
            RoundId::new(0),
            tokens(6),
            "Medium",
            45,
            &mut StdRng::seed_from_u64(9),
        );

        assert_eq!(session.grid().len(), 12);
        assert_eq!(session.pair_count(), 6);
        assert_eq!(session.phase(), RoundPhase::NotStarted);
        assert_eq!(session.token(5).map(|t| t.id), Some(6));
    }
}
