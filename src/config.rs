//! Configuration loading
//!
//! Settings come from `agenda.toml` in the working directory, or from the
//! file passed with `--config`. Every field has a default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::reminder::DEFAULT_WINDOW_MINUTES;
use crate::stats::WeekdayLocale;
use crate::task::DEFAULT_CATEGORIES;

pub const DEFAULT_CONFIG_FILE: &str = "agenda.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backing sheet file
    #[serde(default = "default_sheet")]
    pub sheet: PathBuf,

    /// Create the sheet with its header row when it does not exist
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,

    #[serde(default = "default_window")]
    pub reminder_window_minutes: u32,

    /// Language of weekday names in weekly statistics
    #[serde(default)]
    pub weekday_locale: WeekdayLocale,

    /// Categories offered when adding a task
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheet: default_sheet(),
            create_if_missing: default_create_if_missing(),
            reminder_window_minutes: default_window(),
            weekday_locale: WeekdayLocale::default(),
            categories: default_categories(),
        }
    }
}

fn default_sheet() -> PathBuf {
    PathBuf::from("agenda.csv")
}

fn default_create_if_missing() -> bool {
    true
}

fn default_window() -> u32 {
    DEFAULT_WINDOW_MINUTES
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

impl Config {
    /// Loads `explicit` if given, else `agenda.toml` in `dir` if present,
    /// else defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if !candidate.exists() {
                    return Ok(Self::default());
                }
                candidate
            }
        };
        let contents = fs::read_to_string(&path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(Error::InvalidConfig(
                "categories must list at least one entry".to_string(),
            ));
        }
        if self.reminder_window_minutes > 24 * 60 {
            return Err(Error::InvalidConfig(format!(
                "reminder_window_minutes {} exceeds one day",
                self.reminder_window_minutes
            )));
        }
        Ok(())
    }
}
