//! # Config Module
//!
//! Loads the JSON configuration file.
//!
//! ```json
//! {
//!   "watch_paths": ["/photos/inbox", "/photos/phone"],
//!   "output_path": "/photos/library",
//!   "detect_conflicts": false,
//!   "settle_ms": 500
//! }
//! ```
//!
//! `watch_paths` and `output_path` are required; everything else has a
//! default. A configuration problem is fatal: nothing is watched until the
//! file validates.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Conventional location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/app/config.json";

/// Default settle window for watch events, in milliseconds
pub const DEFAULT_SETTLE_MS: u64 = 500;

/// Raw file contents. Every field is optional so validation can name
/// exactly what is missing.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    watch_paths: Option<Vec<PathBuf>>,
    #[serde(default)]
    output_path: Option<PathBuf>,
    #[serde(default)]
    detect_conflicts: Option<bool>,
    #[serde(default)]
    settle_ms: Option<u64>,
}

/// Validated configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory trees to organize from
    pub watch_paths: Vec<PathBuf>,
    /// Library root that receives `<year>/<year-month-day>/<name>` copies
    pub output_path: PathBuf,
    /// Compare content when a destination name is already taken
    pub detect_conflicts: bool,
    /// Quiet period before a watched file is organized
    pub settle_ms: u64,
}

impl Config {
    /// Read and validate the configuration file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;

        let watch_paths = raw
            .watch_paths
            .filter(|paths| !paths.is_empty())
            .ok_or(ConfigError::MissingWatchPaths)?;

        let output_path = raw
            .output_path
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigError::MissingOutputPath)?;

        Ok(Self {
            watch_paths,
            output_path,
            detect_conflicts: raw.detect_conflicts.unwrap_or(false),
            settle_ms: raw.settle_ms.unwrap_or(DEFAULT_SETTLE_MS),
        })
    }

    /// Settle window as a duration
    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
