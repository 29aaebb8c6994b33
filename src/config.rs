// User configuration
//
// A small YAML file in the home directory selects where the data files live
// and whether reports are colorized. Loaded once at startup and passed by
// reference; there are no process-wide singletons.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".letsdo.yaml";
pub const TASK_FILE_NAME: &str = "letsdo-task";
pub const HISTORY_FILE_NAME: &str = "letsdo-history";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the running-task record and the history log.
    pub data_directory: PathBuf,
    /// Colorize report output.
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_color() -> bool {
    true
}

impl Config {
    pub fn new(data_directory: impl Into<PathBuf>) -> Self {
        Self {
            data_directory: data_directory.into(),
            color: true,
        }
    }

    /// Load the configuration from `<home>/.letsdo.yaml`, creating it with
    /// defaults (data in the home directory, color on) on first run.
    pub fn load(home: &Path) -> Result<Self> {
        let path = home.join(CONFIG_FILE_NAME);
        if !path.exists() {
            let config = Self::new(home);
            config.save(&path)?;
            return Ok(config);
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read configuration: {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("malformed configuration: {}", path.display()))
    }

    /// Resolve the home directory and load from there.
    pub fn load_default() -> Result<Self> {
        let home = dirs::home_dir().context("could not determine the home directory")?;
        Self::load(&home)
    }

    fn save(&self, path: &Path) -> Result<()> {
        let text = serde_yaml::to_string(self)?;
        fs::write(path, text)
            .with_context(|| format!("failed to write configuration: {}", path.display()))
    }

    /// Path of the running-task record; its existence signals a running task.
    pub fn task_file_path(&self) -> PathBuf {
        self.data_directory.join(TASK_FILE_NAME)
    }

    /// Path of the append-only history log.
    pub fn history_file_path(&self) -> PathBuf {
        self.data_directory.join(HISTORY_FILE_NAME)
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("could not determine the home directory")?;
        Ok(home.join(CONFIG_FILE_NAME))
    }
}
