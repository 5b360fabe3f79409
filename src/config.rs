//! Configuration persistence for the trainer.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::quiz::{DEFAULT_QUIZ_LENGTH, MAX_QUIZ_LENGTH, MIN_QUIZ_LENGTH};

/// Application configuration that persists between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The currently selected theme name.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Number of questions a quiz starts with.
    #[serde(default = "default_quiz_length")]
    pub quiz_length: usize,

    /// Show Spanish as the prompt when a new session starts.
    #[serde(default)]
    pub spanish_first: bool,

    /// How long feedback messages stay on screen.
    #[serde(default = "default_message_secs")]
    pub message_secs: u64,
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_quiz_length() -> usize {
    DEFAULT_QUIZ_LENGTH
}

fn default_message_secs() -> u64 {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            quiz_length: default_quiz_length(),
            spanish_first: false,
            message_secs: default_message_secs(),
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("verbos")
            .join("config.toml")
    }

    /// Load config from disk, returning default if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;
        config.quiz_length = config.quiz_length.clamp(MIN_QUIZ_LENGTH, MAX_QUIZ_LENGTH);

        Ok(config)
    }

    /// Save config to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}
