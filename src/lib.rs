// Game engine and terminal plumbing. Rendering stays in the binary.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod controller;
pub mod difficulty;
pub mod error;
pub mod grid;
pub mod run_log;
pub mod runtime;
pub mod scheduler;
pub mod selection;
pub mod session;
pub mod token;

pub use controller::{Controller, RoundSettings};
pub use difficulty::Difficulty;
pub use error::{GameError, TokenError};
