use ratatui::layout::Rect;
use recall::grid::TokenIndex;
use recall::session::{Notice, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFace {
    Down,
    Up,
    Matched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardView {
    pub token: Option<TokenIndex>,
    pub face: CardFace,
}

/// What the player can see of the board, kept in step with the engine's notices.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BoardView {
    cards: Vec<CardView>,
}

impl BoardView {
    pub fn apply(&mut self, notice: &Notice) {
        match notice {
            Notice::BoardReady(cells) => {
                self.cards = cells
                    .iter()
                    .map(|c| CardView {
                        token: c.token,
                        face: if c.face_up { CardFace::Up } else { CardFace::Down },
                    })
                    .collect();
            }
            Notice::Reveal(p) => self.set_face(*p, CardFace::Up),
            Notice::Hide(p) => self.set_face(*p, CardFace::Down),
            Notice::Cleared(p) => self.set_face(*p, CardFace::Matched),
            Notice::SceneChanged(Scene::Inactive) => self.cards.clear(),
            Notice::SceneChanged(Scene::Active) => {}
        }
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn set_face(&mut self, pos: usize, face: CardFace) {
        if let Some(card) = self.cards.get_mut(pos) {
            card.face = face;
        }
    }
}

/// Split `area` into one rect per card, row by row, `columns` cards wide.
pub fn card_rects(area: Rect, cards: usize, columns: u16) -> Vec<Rect> {
    if cards == 0 || area.width == 0 || area.height == 0 {
        return Vec::new();
    }
    let columns = columns.clamp(1, cards as u16);
    let rows = (cards as u16).div_ceil(columns);
    let width = area.width / columns;
    let height = area.height / rows;

    (0..cards as u16)
        .map(|i| Rect {
            x: area.x + (i % columns) * width,
            y: area.y + (i / columns) * height,
            width,
            height,
        })
        .collect()
}

/// Which card, if any, sits under the terminal cell `(column, row)`.
pub fn hit_test(rects: &[Rect], column: u16, row: u16) -> Option<usize> {
    rects.iter().position(|r| {
        column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall::session::CellView;

    fn ready(tokens: &[usize]) -> Notice {
        Notice::BoardReady(
            tokens
                .iter()
                .enumerate()
                .map(|(position, t)| CellView {
                    position,
                    token: Some(*t),
                    face_up: false,
                })
                .collect(),
        )
    }

    #[test]
    fn test_board_follows_notices() {
        let mut board = BoardView::default();
        board.apply(&ready(&[1, 0, 0, 1]));
        assert_eq!(board.len(), 4);
        assert!(board.cards().iter().all(|c| c.face == CardFace::Down));

        board.apply(&Notice::Reveal(0));
        board.apply(&Notice::Reveal(3));
        board.apply(&Notice::Cleared(0));
        board.apply(&Notice::Cleared(3));
        board.apply(&Notice::Reveal(1));
        board.apply(&Notice::Hide(1));

        let faces: Vec<_> = board.cards().iter().map(|c| c.face).collect();
        assert_eq!(
            faces,
            vec![CardFace::Matched, CardFace::Down, CardFace::Down, CardFace::Matched]
        );
    }

    #[test]
    fn test_inactive_scene_clears_board() {
        let mut board = BoardView::default();
        board.apply(&ready(&[0, 0]));
        board.apply(&Notice::SceneChanged(Scene::Inactive));
        assert!(board.is_empty());
    }

    #[test]
    fn test_out_of_range_notice_ignored() {
        let mut board = BoardView::default();
        board.apply(&ready(&[0, 0]));
        board.apply(&Notice::Reveal(7));
        assert!(board.cards().iter().all(|c| c.face == CardFace::Down));
    }

    #[test]
    fn test_card_rects_fill_rows() {
        let rects = card_rects(Rect::new(0, 0, 40, 20), 8, 4);

        assert_eq!(rects.len(), 8);
        assert_eq!(rects[0], Rect::new(0, 0, 10, 10));
        assert_eq!(rects[5], Rect::new(10, 10, 10, 10));
    }

    #[test]
    fn test_hit_test() {
        let rects = card_rects(Rect::new(2, 1, 40, 20), 8, 4);

        assert_eq!(hit_test(&rects, 2, 1), Some(0));
        assert_eq!(hit_test(&rects, 13, 12), Some(5));
        assert_eq!(hit_test(&rects, 0, 0), None);
        assert_eq!(hit_test(&rects, 60, 5), None);
    }
}
