pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use recall::{
    app_dirs::AppDirs,
    clock::{Clock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore, TokenSourceKind},
    controller::Controller,
    difficulty::Difficulty,
    error::TokenError,
    runtime::{ChannelEventSource, GameEvent, GameEventSource, Runner},
    session::{Notice, Scene},
    token::{EmbeddedCatalog, PokeApiSource, TokenSource, POKEAPI_LAST_ID},
};
use std::{
    error::Error,
    fs::{self, File, OpenOptions},
    io::{self, stdin},
    ops::RangeInclusive,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::ui::{
    board::{card_rects, hit_test, BoardView},
    board_area,
    screen::{current_screen, Flow},
};

const TICK_RATE_MS: u64 = 100;

/// timed pair-matching memory game for the terminal
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Flip cards two at a time and find every pair before the clock runs out. Each round is written to a run log you can export as CSV."
)]
pub struct Cli {
    /// difficulty preselected on the setup screen
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// look tokens up live on PokeAPI instead of the bundled catalog
    #[clap(long)]
    online: bool,

    /// number of cards per row
    #[clap(short = 'c', long)]
    columns: Option<u16>,

    /// seed for token draws and board shuffles
    #[clap(long)]
    seed: Option<u64>,

    /// write the run log as CSV to this path on exit
    #[clap(long, value_name = "PATH")]
    export_log: Option<PathBuf>,

    /// store the options given on this run as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer the flags given on the command line over the stored config.
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if self.online {
            config.token_source = TokenSourceKind::PokeApi;
            config.id_range_end = POKEAPI_LAST_ID;
        }
        if let Some(columns) = self.columns {
            config.grid_columns = columns.max(1);
        }
        config
    }
}

/// Build the token source named in `config`, with the id range it can serve.
fn token_source(
    config: &Config,
) -> Result<(Box<dyn TokenSource>, RangeInclusive<u32>), TokenError> {
    let (source, ids): (Box<dyn TokenSource>, _) = match config.token_source {
        TokenSourceKind::Embedded => {
            let catalog = EmbeddedCatalog::kanto()?;
            let end = config.id_range_end.min(catalog.last_id());
            (Box::new(catalog), config.id_range_start..=end)
        }
        TokenSourceKind::PokeApi => (
            Box::new(PokeApiSource::new()),
            config.id_range_start..=config.id_range_end,
        ),
    };
    Ok((source, ids))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Setup,
    Playing,
}

pub struct App {
    pub config: Config,
    pub controller: Controller<Box<dyn Clock>>,
    pub board: BoardView,
    pub state: AppState,
    pub difficulty: Difficulty,
    pub cursor: usize,
    /// Last error worth showing on the setup screen.
    pub status: Option<String>,
    source: Box<dyn TokenSource>,
    ids: RangeInclusive<u32>,
    rng: StdRng,
}

impl App {
    pub fn new(
        config: Config,
        clock: Box<dyn Clock>,
        source: Box<dyn TokenSource>,
        ids: RangeInclusive<u32>,
        rng: StdRng,
    ) -> Self {
        Self {
            controller: Controller::new(clock, config.round_settings()),
            difficulty: config.difficulty,
            config,
            board: BoardView::default(),
            state: AppState::Setup,
            cursor: 0,
            status: None,
            source,
            ids,
            rng,
        }
    }

    pub fn start_round(&mut self) {
        let started = self.controller.start_round(
            self.difficulty,
            &*self.source,
            self.ids.clone(),
            &mut self.rng,
        );
        match started {
            Ok(_) => {
                self.status = None;
                self.cursor = 0;
            }
            Err(e) => {
                warn!(error = %e, "could not start round");
                self.status = Some(format!("Could not start round: {e}"));
            }
        }
        self.sync();
    }

    pub fn click(&mut self, pos: usize) {
        match self.controller.click(pos) {
            Ok(outcome) => debug!(pos, ?outcome, "click"),
            Err(e) => debug!(pos, error = %e, "click dropped"),
        }
        self.sync();
    }

    pub fn quit_round(&mut self) {
        if let Err(e) = self.controller.quit() {
            debug!(error = %e, "nothing to quit");
        }
        self.sync();
    }

    pub fn on_tick(&mut self) {
        self.controller.pump();
        self.sync();
    }

    /// Map a mouse press on a frame of size `area` to the card under it.
    pub fn on_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if self.state != AppState::Playing
            || mouse.kind != MouseEventKind::Down(MouseButton::Left)
        {
            return;
        }
        let rects = card_rects(board_area(area), self.board.len(), self.config.grid_columns);
        if let Some(pos) = hit_test(&rects, mouse.column, mouse.row) {
            self.cursor = pos;
            self.click(pos);
        }
    }

    /// Move the keyboard cursor over the board, wrapping at the edges.
    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let len = self.board.len();
        if len == 0 {
            return;
        }
        let columns = (self.config.grid_columns as usize).clamp(1, len);
        let rows = len.div_ceil(columns);
        let col = (self.cursor % columns) as i32 + dx;
        let row = (self.cursor / columns) as i32 + dy;
        let pos = row.rem_euclid(rows as i32) as usize * columns
            + col.rem_euclid(columns as i32) as usize;
        self.cursor = pos.min(len - 1);
    }

    /// Feed the controller's notices to the board and follow scene changes.
    fn sync(&mut self) {
        for notice in self.controller.drain_notices() {
            self.board.apply(&notice);
            if let Notice::SceneChanged(scene) = notice {
                self.state = match scene {
                    Scene::Active => AppState::Playing,
                    Scene::Inactive => AppState::Setup,
                };
            }
        }
        if self.cursor >= self.board.len() {
            self.cursor = 0;
        }
    }

    pub fn export_log(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let file = File::create(path)?;
        self.controller.run_log().write_csv(file)?;
        info!(path = %path.display(), rounds = self.controller.run_log().len(), "run log exported");
        Ok(())
    }
}

/// Log to a file under the state dir; the terminal belongs to the UI.
/// Any failure here just leaves logging off.
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_env("RECALL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "config saved");
    }

    let (source, ids) = token_source(&config)?;
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut app = App::new(config, Box::new(SystemClock::new()), source, ids, rng);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        ChannelEventSource::terminal(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result?;

    if let Some(path) = &cli.export_log {
        app.export_log(path)?;
    }

    Ok(())
}

fn start_tui<B, E>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>>
where
    B: Backend,
    E: GameEventSource,
{
    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            GameEvent::Tick | GameEvent::Resize => {}
            GameEvent::Mouse(mouse) => {
                let size = terminal.size()?;
                app.on_mouse(mouse, Rect::new(0, 0, size.width, size.height));
            }
            GameEvent::Key(key) => {
                // ctrl+c leaves from any screen
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    break;
                }
                let mut screen = current_screen(&app.state);
                if screen.on_key(key, app) == Flow::Exit {
                    break;
                }
            }
        }

        // steady input never yields a Tick, so timers run after every event
        app.on_tick();
    }

    if app.controller.is_active() {
        app.quit_round();
    }
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}
