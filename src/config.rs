//! Arcade Configuration
//!
//! Tuning for both games plus where leaderboards live. Every field has a
//! default, so a config file only needs the values it changes:
//!
//! ```json
//! { "shooter": { "round_secs": 45, "max_targets": 8 } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::matching::{validate_symbols, LayoutError, MatchConfig};
use crate::game::shooter::ShooterConfig;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid config JSON.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A timer interval is zero.
    #[error("{0} must be at least 1 ms")]
    ZeroInterval(&'static str),

    /// The Match alphabet cannot form a board.
    #[error("invalid matching.symbols: {0}")]
    Symbols(#[from] LayoutError),
}

/// Settings for the whole arcade.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    /// Match round tuning
    pub matching: MatchConfig,
    /// Shooter round tuning
    pub shooter: ShooterConfig,
    /// Leaderboard directory; the system temp directory when unset
    pub storage_dir: Option<PathBuf>,
}

impl ArcadeConfig {
    /// Parse and validate config JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no round can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("matching.clock_interval_ms", self.matching.clock_interval_ms),
            ("shooter.countdown_interval_ms", self.shooter.countdown_interval_ms),
            ("shooter.spawn_interval_ms", self.shooter.spawn_interval_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ZeroInterval(name));
            }
        }
        validate_symbols(&self.matching.symbols)?;
        Ok(())
    }

    /// Read a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Leaderboard directory to use.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("arcade-rounds"))
    }
}
