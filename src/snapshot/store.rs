//! On-disk snapshot file.

use super::Snapshot;
use crate::error::{Result, RollingError};
use crate::fsio;
use crate::types::Track;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Snapshot persisted as a JSON array of tracks.
pub struct SnapshotStore {
    /// Path to the snapshot file.
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the last saved snapshot.
    ///
    /// A missing file is the first run and yields an empty snapshot.
    pub fn load(&self) -> Result<Snapshot> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Snapshot::new()),
            Err(e) => return Err(e.into()),
        };

        // Snapshots written before the first track was ever stored were `{}`.
        if data.iter().all(u8::is_ascii_whitespace) || is_empty_object(&data) {
            return Ok(Snapshot::new());
        }

        let tracks: Vec<Track> = serde_json::from_slice(&data).map_err(|e| {
            RollingError::Deserialization(format!("{}: {}", self.path.display(), e))
        })?;

        Ok(Snapshot::from_tracks(tracks))
    }

    /// Replace the stored snapshot.
    ///
    /// Goes through a temp file and rename so a crash leaves either the old
    /// or the new snapshot on disk.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let data = fsio::to_indented_json(snapshot.tracks())?;
        fsio::write_atomic(&self.path, &data)
    }
}

fn is_empty_object(data: &[u8]) -> bool {
    matches!(
        serde_json::from_slice::<serde_json::Value>(data),
        Ok(serde_json::Value::Object(map)) if map.is_empty()
    )
}
