//! Tracklist snapshot carried between runs.
//!
//! The snapshot is the only mutable state: what is on the playlist now and
//! how many plays each track had when it was added.

mod store;

pub use store::SnapshotStore;

use crate::identity;
use crate::types::Track;

/// Ordered set of tracks with no two entries being the same track.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    tracks: Vec<Track>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot, keeping the first occurrence of each track.
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        let mut snapshot = Self::new();
        for track in tracks {
            snapshot.insert(track);
        }
        snapshot
    }

    /// Add `track` unless the same track is already present.
    ///
    /// Returns false if it was a duplicate.
    pub fn insert(&mut self, track: Track) -> bool {
        if identity::find(&self.tracks, &track).is_some() {
            return false;
        }
        self.tracks.push(track);
        true
    }

    pub fn find(&self, target: &Track) -> Option<&Track> {
        identity::find(&self.tracks, target)
    }

    pub fn contains(&self, target: &Track) -> bool {
        self.find(target).is_some()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse_to_first() {
        let snapshot = Snapshot::from_tracks(vec![
            Track::new("Song", ["A"], "X").with_playcount(1),
            Track::new("Other", ["A"], "X"),
            Track::new("Song", ["A"], "X").with_playcount(9),
        ]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.tracks()[0].playcount, 1);
        assert_eq!(snapshot.tracks()[1].name, "Other");
    }

    #[test]
    fn test_insert_reports_duplicate() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.insert(Track::new("Song", ["A"], "X")));
        assert!(!snapshot.insert(Track::new("Song", ["A"], "X")));
        assert!(snapshot.insert(Track::new("Song", ["B"], "X")));
        assert!(snapshot.contains(&Track::new("Song", ["B"], "X")));
    }
}
