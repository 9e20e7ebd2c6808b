use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::controller::RoundSettings;
use crate::difficulty::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TokenSourceKind {
    /// Tokens bundled with the binary.
    #[default]
    Embedded,
    /// Live lookups against PokeAPI.
    PokeApi,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub difficulty: Difficulty,
    pub token_source: TokenSourceKind,
    pub id_range_start: u32,
    pub id_range_end: u32,
    pub grid_columns: u16,
    pub record_quit_rounds: bool,
    pub mismatch_delay_ms: u64,
    pub tick_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            token_source: TokenSourceKind::Embedded,
            id_range_start: 1,
            id_range_end: 151,
            grid_columns: 4,
            record_quit_rounds: true,
            mismatch_delay_ms: 1000,
            tick_ms: 1000,
        }
    }
}

impl Config {
    pub fn round_settings(&self) -> RoundSettings {
        RoundSettings {
            tick_every: Duration::from_millis(self.tick_ms.max(1)),
            mismatch_delay: Duration::from_millis(self.mismatch_delay_ms),
            record_quit_rounds: self.record_quit_rounds,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("recall_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            difficulty: Difficulty::Insane,
            token_source: TokenSourceKind::PokeApi,
            id_range_start: 1,
            id_range_end: 512,
            grid_columns: 6,
            record_quit_rounds: false,
            mismatch_delay_ms: 750,
            tick_ms: 500,
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "difficulty": "Hard" }"#).unwrap();

        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.difficulty, Difficulty::Hard);
        assert_eq!(loaded.grid_columns, 4);
    }

    #[test]
    fn round_settings_from_config() {
        let settings = Config::default().round_settings();
        assert_eq!(settings.tick_every, Duration::from_secs(1));
        assert_eq!(settings.mismatch_delay, Duration::from_secs(1));
        assert!(settings.record_quit_rounds);
    }
}
