use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{DEFAULT_FRIGHTENED_SECS, TILE_SIZE};

/// Parsed session configuration, read from a JSON file in the same shape the
/// game has always used: map path, starting lives, entity speed, frightened
/// duration and the scatter/chase phase lengths.
#[derive(Clone, Debug, Deserialize)]
pub struct GameConfig {
    pub map: PathBuf,
    pub lives: u32,
    pub speed: i32,
    #[serde(rename = "frightenedLength", default = "default_frightened_secs")]
    pub frightened_length: u32,
    #[serde(rename = "modeLengths")]
    pub mode_lengths: Vec<u32>,
}

fn default_frightened_secs() -> u32 {
    DEFAULT_FRIGHTENED_SECS
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("lives must be positive")]
    ZeroLives,
    #[error("speed must be a positive divisor of the 16px tile, got {0}")]
    BadSpeed(i32),
    #[error("frightened length must be positive")]
    ZeroFrightenedLength,
    #[error("mode lengths must be non-empty and positive")]
    BadModeLengths,
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lives == 0 {
            return Err(ConfigError::ZeroLives);
        }
        if self.speed <= 0 || TILE_SIZE % self.speed != 0 {
            return Err(ConfigError::BadSpeed(self.speed));
        }
        if self.frightened_length == 0 {
            return Err(ConfigError::ZeroFrightenedLength);
        }
        if self.mode_lengths.is_empty() || self.mode_lengths.contains(&0) {
            return Err(ConfigError::BadModeLengths);
        }
        Ok(())
    }
}
