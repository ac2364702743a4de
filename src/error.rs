//! Error types for the rolling playlist log.

use thiserror::Error;

/// Main error type for reconciliation and log operations.
#[derive(Debug, Error)]
pub enum RollingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The log file does not end in a JSON array terminator, or is shorter
    /// than the truncation asked for.
    #[error("Malformed log: {0}")]
    MalformedLog(String),

    #[error("Scrobble lookup failed for {track:?} by {artist:?}: {reason}")]
    Lookup {
        artist: String,
        track: String,
        reason: String,
    },

    #[error("Playlist source error: {0}")]
    Source(String),

    #[error("Duplicate track in observed tracklist: {0}")]
    DuplicateTrack(String),

    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    #[error("Config is missing required fields: {}", .0.join(", "))]
    MissingConfigFields(Vec<String>),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Data directory is locked by another run")]
    Locked,
}

impl From<serde_json::Error> for RollingError {
    fn from(e: serde_json::Error) -> Self {
        RollingError::Serialization(e.to_string())
    }
}

/// Result type for rolling log operations.
pub type Result<T> = std::result::Result<T, RollingError>;
