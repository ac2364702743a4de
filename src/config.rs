//! Run configuration.
//!
//! Read from the same JSON file the playlist and scrobble clients are
//! configured from; keys this crate does not use (credentials and the like)
//! are ignored.

use crate::error::{Result, RollingError};
use crate::reconcile::DuplicatePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Keys that must be present in a config file.
pub const REQUIRED_FIELDS: &[&str] = &["DATA_DIR", "STORAGE_FILENAME", "LOG_FILENAME"];

/// Configuration for a reconciliation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RunConfig {
    /// Directory holding the snapshot, the log and the run lock.
    pub data_dir: PathBuf,

    /// Snapshot file name inside `data_dir`.
    pub storage_filename: String,

    /// History log file name inside `data_dir`.
    pub log_filename: String,

    /// Emit the run summary at info level instead of debug.
    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Subject line for change notifications.
    #[serde(default = "default_subject")]
    pub notify_subject: String,
}

fn default_subject() -> String {
    "your rolling playlist was updated!".to_string()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            storage_filename: "tracklist.json".to_string(),
            log_filename: "log.json".to_string(),
            verbose: false,
            duplicate_policy: DuplicatePolicy::default(),
            notify_subject: default_subject(),
        }
    }
}

impl RunConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), data_dir = %config.data_dir.display(), "loaded config");
        Ok(config)
    }

    /// Parse a config, reporting every missing required key at once.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| RollingError::InvalidConfig(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| RollingError::InvalidConfig("config must be a JSON object".into()))?;

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !object.contains_key(**field))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RollingError::MissingConfigFields(missing));
        }

        serde_json::from_value(value).map_err(|e| RollingError::InvalidConfig(e.to_string()))
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage_filename)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.log_filename)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join("LOCK")
    }
}
