//! Engine configuration
//!
//! Built by the native shell and passed to `HistoryEngine::new`, or read from
//! a JSON file with `EngineConfig::from_json_file`.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::interface::{ClipStackError, RetentionLimits};

/// Default retention: the 200 most recent entries
pub const DEFAULT_MAX_COUNT: u32 = 200;

/// File name of the history inside the data directory
pub const HISTORY_FILE_NAME: &str = "clipboard-datas.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, uniffi::Record)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Location of the JSON history file
    pub history_path: String,
    pub max_count: Option<u32>,
    pub max_age_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path().to_string_lossy().into_owned(),
            max_count: Some(DEFAULT_MAX_COUNT),
            max_age_ms: None,
        }
    }
}

impl EngineConfig {
    /// Config with default retention and the given history location
    pub fn with_history_path(path: impl AsRef<Path>) -> Self {
        Self {
            history_path: path.as_ref().to_string_lossy().into_owned(),
            ..Self::default()
        }
    }

    /// Read a JSON config file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ClipStackError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            ClipStackError::InvalidInput(format!("cannot read config {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            ClipStackError::InvalidInput(format!("bad config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClipStackError> {
        if self.history_path.trim().is_empty() {
            return Err(ClipStackError::InvalidInput("history path is empty".into()));
        }
        self.retention_limits().validate()
    }

    pub fn retention_limits(&self) -> RetentionLimits {
        RetentionLimits {
            max_count: self.max_count,
            max_age_ms: self.max_age_ms,
        }
    }
}

impl RetentionLimits {
    /// A count limit of zero would have to drop the entry just captured
    pub fn validate(&self) -> Result<(), ClipStackError> {
        if self.max_count == Some(0) {
            return Err(ClipStackError::InvalidInput(
                "max_count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Platform data directory, falling back to the working directory
pub fn default_history_path() -> PathBuf {
    ProjectDirs::from("dev", "clipstack", "clipstack")
        .map(|dirs| dirs.data_dir().join(HISTORY_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(HISTORY_FILE_NAME))
}
