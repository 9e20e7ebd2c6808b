use rand::seq::SliceRandom;
use rand::Rng;

/// Index into the round's token list.
pub type TokenIndex = usize;

/// One grid position: the token it hides, or `None` once its pair is cleared.
pub type Cell = Option<TokenIndex>;

/// The shuffled board for one round.
///
/// Every token index still in play occupies exactly two cells; a cleared
/// pair occupies none. `cleared_pairs() + remaining_pairs() == pair_count()`
/// holds at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
    pair_count: usize,
}

impl Grid {
    /// Lay out `[0, 0, 1, 1, ..]` for `pair_count` tokens and shuffle it.
    pub fn generate<R: Rng + ?Sized>(pair_count: usize, rng: &mut R) -> Self {
        let mut layout: Vec<TokenIndex> = (0..pair_count).flat_map(|i| [i, i]).collect();
        layout.shuffle(rng);
        Self::from_layout(layout)
    }

    /// Build a grid from a known arrangement of token indices.
    pub fn from_layout(layout: Vec<TokenIndex>) -> Self {
        let pair_count = layout.len() / 2;
        Self {
            cells: layout.into_iter().map(Some).collect(),
            pair_count,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every one of `token_count` token indices sits in exactly two
    /// cells and nothing else is on the board.
    pub fn pairs_up(&self, token_count: usize) -> bool {
        if self.pair_count != token_count || self.cells.len() != 2 * token_count {
            return false;
        }
        let mut seen = vec![0u8; token_count];
        for cell in &self.cells {
            match cell.and_then(|index| seen.get_mut(index)) {
                Some(n) => *n += 1,
                None => return false,
            }
        }
        seen.iter().all(|n| *n == 2)
    }

    pub fn pair_count(&self) -> usize {
        self.pair_count
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos < self.cells.len()
    }

    /// Token still hidden at `pos`; `None` when cleared or off the board.
    pub fn token_at(&self, pos: usize) -> Option<TokenIndex> {
        self.cells.get(pos).copied().flatten()
    }

    pub fn is_cleared(&self, pos: usize) -> bool {
        matches!(self.cells.get(pos), Some(None))
    }

    /// Remove a matched pair from play.
    pub fn clear_pair(&mut self, first: usize, second: usize) {
        debug_assert_eq!(self.token_at(first), self.token_at(second));
        self.cells[first] = None;
        self.cells[second] = None;
    }

    pub fn remaining_pairs(&self) -> usize {
        self.cells.iter().flatten().count() / 2
    }

    pub fn cleared_pairs(&self) -> usize {
        self.pair_count - self.remaining_pairs()
    }
}
