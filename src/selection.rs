use crate::grid::{Grid, TokenIndex};

/// Where the round is in the pick-two cycle. Session scoped, never per card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Empty,
    FirstChosen(usize),
    /// Two different cards are face up and input is locked until they flip back.
    Resolving { first: usize, second: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Locked,
    Cleared,
    OutOfRange,
}

/// What a single click did. Everything except `Ignored` counts as a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Ignored(IgnoreReason),
    Selected(usize),
    Deselected(usize),
    Matched {
        first: usize,
        second: usize,
        token: TokenIndex,
    },
    Mismatched {
        first: usize,
        second: usize,
    },
}

impl ClickOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, ClickOutcome::Ignored(_))
    }
}

#[derive(Debug, Default)]
pub struct SelectionMachine {
    state: SelectionState,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, SelectionState::Resolving { .. })
    }

    /// Apply one click at `pos`. A match clears both cells from `grid` right away;
    /// a mismatch locks input until [`SelectionMachine::resolve`] is called.
    pub fn on_card_clicked(&mut self, pos: usize, grid: &mut Grid) -> ClickOutcome {
        if self.is_locked() {
            return ClickOutcome::Ignored(IgnoreReason::Locked);
        }
        if !grid.contains(pos) {
            return ClickOutcome::Ignored(IgnoreReason::OutOfRange);
        }
        let Some(token) = grid.token_at(pos) else {
            return ClickOutcome::Ignored(IgnoreReason::Cleared);
        };

        match self.state {
            SelectionState::Empty => {
                self.state = SelectionState::FirstChosen(pos);
                ClickOutcome::Selected(pos)
            }
            SelectionState::FirstChosen(first) if first == pos => {
                self.state = SelectionState::Empty;
                ClickOutcome::Deselected(pos)
            }
            SelectionState::FirstChosen(first) => {
                if grid.token_at(first) == Some(token) {
                    grid.clear_pair(first, pos);
                    self.state = SelectionState::Empty;
                    ClickOutcome::Matched {
                        first,
                        second: pos,
                        token,
                    }
                } else {
                    self.state = SelectionState::Resolving { first, second: pos };
                    ClickOutcome::Mismatched { first, second: pos }
                }
            }
            SelectionState::Resolving { .. } => ClickOutcome::Ignored(IgnoreReason::Locked),
        }
    }

    /// Finish a mismatch: returns the two positions to flip back face down.
    pub fn resolve(&mut self) -> Option<(usize, usize)> {
        match self.state {
            SelectionState::Resolving { first, second } => {
                self.state = SelectionState::Empty;
                Some((first, second))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_first_click_selects() {
        let mut grid = Grid::from_layout(vec![1, 0, 0, 1]);
        let mut machine = SelectionMachine::new();

        assert_eq!(machine.on_card_clicked(0, &mut grid), ClickOutcome::Selected(0));
        assert_eq!(machine.state(), SelectionState::FirstChosen(0));
    }

    #[test]
    fn test_same_card_twice_deselects() {
        let mut grid = Grid::from_layout(vec![0, 0]);
        let mut machine = SelectionMachine::new();

        machine.on_card_clicked(0, &mut grid);
        let outcome = machine.on_card_clicked(0, &mut grid);

        assert_eq!(outcome, ClickOutcome::Deselected(0));
        assert!(outcome.is_accepted());
        assert_eq!(machine.state(), SelectionState::Empty);
        assert_eq!(grid.remaining_pairs(), 1);
    }

    #[test]
    fn test_match_clears_both_cells() {
        let mut grid = Grid::from_layout(vec![1, 0, 0, 1]);
        let mut machine = SelectionMachine::new();

        machine.on_card_clicked(0, &mut grid);
        let outcome = machine.on_card_clicked(3, &mut grid);

        assert_matches!(
            outcome,
            ClickOutcome::Matched {
                first: 0,
                second: 3,
                token: 1
            }
        );
        assert_eq!(grid.cells(), &[None, Some(0), Some(0), None]);
        assert_eq!(machine.state(), SelectionState::Empty);
    }

    #[test]
    fn test_mismatch_locks_until_resolved() {
        let mut grid = Grid::from_layout(vec![1, 0, 0, 1]);
        let mut machine = SelectionMachine::new();

        machine.on_card_clicked(0, &mut grid);
        assert_eq!(
            machine.on_card_clicked(1, &mut grid),
            ClickOutcome::Mismatched {
                first: 0,
                second: 1
            }
        );
        assert!(machine.is_locked());

        // Even a click that would complete a pair is refused while locked.
        assert_eq!(
            machine.on_card_clicked(3, &mut grid),
            ClickOutcome::Ignored(IgnoreReason::Locked)
        );

        assert_eq!(machine.resolve(), Some((0, 1)));
        assert_eq!(machine.state(), SelectionState::Empty);
        assert_eq!(grid.remaining_pairs(), 2);
    }

    #[test]
    fn test_resolve_without_mismatch_is_noop() {
        let mut machine = SelectionMachine::new();
        assert_eq!(machine.resolve(), None);
    }

    #[test]
    fn test_cleared_and_out_of_range_clicks_ignored() {
        let mut grid = Grid::from_layout(vec![0, 0, 1, 1]);
        let mut machine = SelectionMachine::new();
        machine.on_card_clicked(0, &mut grid);
        machine.on_card_clicked(1, &mut grid);

        assert_eq!(
            machine.on_card_clicked(0, &mut grid),
            ClickOutcome::Ignored(IgnoreReason::Cleared)
        );
        assert_eq!(
            machine.on_card_clicked(4, &mut grid),
            ClickOutcome::Ignored(IgnoreReason::OutOfRange)
        );
        assert_eq!(machine.state(), SelectionState::Empty);
    }

    #[test]
    fn test_cleared_click_keeps_first_choice() {
        let mut grid = Grid::from_layout(vec![0, 0, 1, 1]);
        let mut machine = SelectionMachine::new();
        machine.on_card_clicked(0, &mut grid);
        machine.on_card_clicked(1, &mut grid);
        machine.on_card_clicked(2, &mut grid);

        machine.on_card_clicked(1, &mut grid);

        assert_eq!(machine.state(), SelectionState::FirstChosen(2));
    }
}
