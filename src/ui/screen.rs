use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;

use crate::{
    ui::{render_game, render_setup},
    App, AppState,
};

/// What the main loop should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A UI Screen boundary: responsible for rendering and key handling
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> Flow;
}

/// Difficulty picker plus the run log.
pub struct SetupScreen;

impl Screen for SetupScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_setup(app, f.area(), f.buffer_mut());
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> Flow {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Exit,
            KeyCode::Left | KeyCode::Char('h') => app.difficulty = app.difficulty.prev(),
            KeyCode::Right | KeyCode::Char('l') => app.difficulty = app.difficulty.next(),
            KeyCode::Enter | KeyCode::Char(' ') => app.start_round(),
            _ => {}
        }
        Flow::Continue
    }
}

/// The board of a running round.
pub struct GameScreen;

impl Screen for GameScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_game(app, f.area(), f.buffer_mut());
    }

    fn on_key(&mut self, key: KeyEvent, app: &mut App) -> Flow {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => app.quit_round(),
            KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => app.move_cursor(1, 0),
            KeyCode::Up | KeyCode::Char('k') => app.move_cursor(0, -1),
            KeyCode::Down | KeyCode::Char('j') => app.move_cursor(0, 1),
            KeyCode::Enter | KeyCode::Char(' ') => app.click(app.cursor),
            _ => {}
        }
        Flow::Continue
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Setup => Box::new(SetupScreen),
        AppState::Playing => Box::new(GameScreen),
    }
}
