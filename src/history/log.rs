//! JSON-array history log with in-place append.

use super::truncate::{last_content_byte, last_non_whitespace, truncate_chars};
use crate::error::{Result, RollingError};
use crate::fsio;
use crate::types::{LogDate, LogEntry, Track};
use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// History log stored as a JSON array.
///
/// Not safe for concurrent writers; callers serialize runs (see
/// [`crate::Runner`]).
pub struct HistoryLog {
    /// Path to the log file.
    path: PathBuf,
}

impl HistoryLog {
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

    /// Write the genesis entry if the log does not exist yet.
    ///
    /// Starting tracks are logged without play counts. Returns whether the
    /// file was created.
    pub fn create_if_absent(&self, tracks: &[Track], date: LogDate) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        let entries = vec![LogEntry::genesis(date, tracks)];
        fsio::write_atomic(&self.path, &fsio::to_indented_json(&entries)?)?;

        Ok(true)
    }

    /// Log a diff entry for a balanced exchange.
    ///
    /// Nothing is written, and false is returned, unless `removed` is
    /// non-empty and has as many tracks as `added`. Removed tracks keep their
    /// final play count; added tracks are logged without one.
    pub fn append(&self, removed: &[Track], added: &[Track], date: LogDate) -> Result<bool> {
        if removed.is_empty() || removed.len() != added.len() {
            return Ok(false);
        }

        self.append_entry(&LogEntry::diff(date, removed, added))?;
        Ok(true)
    }

    /// Reseal the array with `entry` as its new last element.
    ///
    /// Only the closing bracket is rewritten; existing entries are never read
    /// back into memory.
    pub fn append_entry(&self, entry: &LogEntry) -> Result<()> {
        let body = serde_json::to_vec(entry)?;

        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        let len = file.metadata()?.len();

        let bracket = match last_content_byte(&mut file, len)? {
            Some((offset, b']')) => offset,
            Some((offset, b)) => {
                return Err(RollingError::MalformedLog(format!(
                    "{}: expected ']' at byte {}, found {:?}",
                    self.path.display(),
                    offset,
                    b as char
                )));
            }
            None => {
                return Err(RollingError::MalformedLog(format!(
                    "{}: log file is empty",
                    self.path.display()
                )));
            }
        };

        // Validated before truncating so a rejected log is left as it was.
        let separator: &[u8] = match last_non_whitespace(&mut file, bracket)? {
            Some(b'[') => b"\n",
            Some(_) => b",\n",
            None => {
                return Err(RollingError::MalformedLog(format!(
                    "{}: no opening '['",
                    self.path.display()
                )));
            }
        };

        let cut = truncate_chars(&mut file, 1)?;

        let mut tail = Vec::with_capacity(separator.len() + body.len() + 2);
        tail.extend_from_slice(separator);
        tail.extend_from_slice(&body);
        tail.extend_from_slice(b"\n]");

        file.seek(SeekFrom::Start(cut))?;
        file.write_all(&tail)?;
        file.sync_all()?;

        Ok(())
    }

    /// Parse every entry in the log.
    pub fn read_all(&self) -> Result<Vec<LogEntry>> {
        let data = fs::read(&self.path)?;
        serde_json::from_slice(&data).map_err(|e| {
            RollingError::Deserialization(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Pretty-print the whole log into `out`, which may be the log itself.
    ///
    /// Entries are carried over as generic JSON so fields this crate does not
    /// know about survive. Must not run while another process appends.
    /// Returns the number of entries written.
    pub fn finalize_to(&self, out: impl AsRef<Path>) -> Result<usize> {
        let data = fs::read(&self.path)?;
        let value: serde_json::Value = serde_json::from_slice(&data).map_err(|e| {
            RollingError::MalformedLog(format!("{}: {}", self.path.display(), e))
        })?;

        let entries = match value {
            serde_json::Value::Array(entries) => entries,
            _ => {
                return Err(RollingError::MalformedLog(format!(
                    "{}: top-level value is not an array",
                    self.path.display()
                )));
            }
        };

        fsio::write_atomic(out.as_ref(), &fsio::to_indented_json(&entries)?)?;
        Ok(entries.len())
    }
}
