use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "recall").map(|pd| pd.config_dir().join("config.json"))
    }

    /// Where the game writes its own log file; stdout belongs to the TUI.
    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("recall.log"))
    }

    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("recall"))
        } else {
            ProjectDirs::from("", "", "recall").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }
}
