//! Reconciliation of the live tracklist against the previous snapshot.

mod reconciler;
mod summary;

pub use reconciler::Reconciler;
pub use summary::{format_artists, summarize};

use crate::error::{Result, RollingError};
use crate::snapshot::Snapshot;
use crate::sources::ScrobbleSource;
use crate::types::{PlayEvent, Track};
use serde::{Deserialize, Serialize};

/// What to do when the live tracklist lists the same track twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep the first occurrence; later ones are reported in
    /// [`Reconciliation::duplicates`].
    #[default]
    Collapse,

    /// Fail the run before any scrobble lookup.
    Reject,
}

/// Outcome of one reconciliation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    /// Snapshot to persist: kept tracks followed by newly added ones.
    pub snapshot: Snapshot,

    /// Previous records of tracks still on the playlist.
    pub kept: Vec<Track>,

    /// Tracks new to the playlist, counted up to yesterday.
    pub added: Vec<Track>,

    /// Tracks that left the playlist, with plays accrued while on it.
    pub removed: Vec<Track>,

    /// Observed entries dropped because an earlier entry was the same track.
    pub duplicates: Vec<Track>,

    /// One line per removed then added track; empty if nothing changed.
    pub summary: String,
}

impl Reconciliation {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    /// True when tracks were removed and exactly as many were added.
    pub fn is_balanced(&self) -> bool {
        !self.removed.is_empty() && self.removed.len() == self.added.len()
    }
}

/// Scrobbles of `track`, looked up by its primary artist and name.
pub fn lookup_plays<S>(scrobbles: &S, track: &Track) -> Result<Vec<PlayEvent>>
where
    S: ScrobbleSource + ?Sized,
{
    let artist = track
        .primary_artist()
        .ok_or_else(|| RollingError::InvalidTrack(format!("{:?} has no artists", track.name)))?;
    scrobbles.scrobbles(artist, &track.name)
}
