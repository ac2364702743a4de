//! Track identity.
//!
//! Two records are the same track when name, artist list (in order) and
//! album all match. No external identifier is consulted, so a reissue or a
//! reordered artist credit counts as a different track.
//!
//! Lookups are linear scans; playlists hold tens of tracks.

use crate::types::Track;

/// True if `a` and `b` refer to the same song.
pub fn same_track(a: &Track, b: &Track) -> bool {
    a.name == b.name && a.artists == b.artists && a.album == b.album
}

/// First track in `tracks` that is the same track as `target`.
pub fn find<'a>(tracks: &'a [Track], target: &Track) -> Option<&'a Track> {
    tracks.iter().find(|t| same_track(t, target))
}

/// Index of the first track in `tracks` that is the same track as `target`.
pub fn position(tracks: &[Track], target: &Track) -> Option<usize> {
    tracks.iter().position(|t| same_track(t, target))
}
