//! CLI configuration management.
//!
//! Reads/writes JSON at `~/.config/gameshelf/config.json`.

use std::path::{Path, PathBuf};

use gameshelf_game::{ConfigSource, INSTALL_DIR_KEY};
use serde::{Deserialize, Serialize};

const DEFAULT_INSTALL_DIR: &str = "~/GOG Games";
const DEFAULT_WINE_COMMAND: &str = "wine";

/// On-disk config format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    install_dir: String,
    #[serde(default)]
    wine_command: String,
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Games root; a leading `~/` expands to `$HOME`.
    pub install_dir: String,
    pub wine_command: String,
    file_path: PathBuf,
}

impl Config {
    /// Loads configuration from `~/.config/gameshelf/config.json`.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(config_file_path())
    }

    /// Loads configuration from `file_path`, falling back to defaults.
    pub fn load_from(file_path: PathBuf) -> anyhow::Result<Self> {
        let mut config = Config {
            install_dir: DEFAULT_INSTALL_DIR.into(),
            wine_command: DEFAULT_WINE_COMMAND.into(),
            file_path,
        };

        if config.file_path.exists() {
            let content = std::fs::read_to_string(&config.file_path)?;
            match serde_json::from_str::<ConfigFile>(&content) {
                Ok(file) => {
                    if !file.install_dir.is_empty() {
                        config.install_dir = file.install_dir;
                    }
                    if !file.wine_command.is_empty() {
                        config.wine_command = file.wine_command;
                    }
                }
                Err(e) => tracing::warn!(
                    path = %config.file_path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                ),
            }
        }

        Ok(config)
    }

    /// Saves configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = ConfigFile {
            install_dir: self.install_dir.clone(),
            wine_command: self.wine_command.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.file_path, json)?;

        tracing::debug!(path = %self.file_path.display(), "configuration saved");
        Ok(())
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Games root with `~` expanded.
    pub fn install_root(&self) -> PathBuf {
        expand_home(&self.install_dir)
    }
}

impl ConfigSource for Config {
    fn get(&self, key: &str) -> Option<String> {
        (key == INSTALL_DIR_KEY).then(|| self.install_root().to_string_lossy().into_owned())
    }
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".into()))
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().join(rest),
        None if path == "~" => home_dir(),
        None => PathBuf::from(path),
    }
}

fn config_file_path() -> PathBuf {
    home_dir().join(".config").join("gameshelf").join("config.json")
}
