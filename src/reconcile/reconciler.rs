//! Tracklist diffing and play-count accounting.

use super::{lookup_plays, summarize, DuplicatePolicy, Reconciliation};
use crate::error::{Result, RollingError};
use crate::identity;
use crate::snapshot::Snapshot;
use crate::sources::ScrobbleSource;
use crate::types::{LogDate, PlayCount, Track};

/// Diffs an observed tracklist against the previous snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reconciler {
    policy: DuplicatePolicy,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Reconcile `observed` against `previous`.
    ///
    /// - kept tracks carry their previous record unchanged
    /// - removed tracks get `playcount = scrobbles - previous playcount`
    ///   and `date_out = today`
    /// - added tracks get the plays made before yesterday and `date_in = today`
    ///
    /// A scrobble lookup error aborts the whole pass.
    pub fn reconcile<S>(
        &self,
        observed: &[Track],
        previous: &Snapshot,
        scrobbles: &S,
        today: LogDate,
    ) -> Result<Reconciliation>
    where
        S: ScrobbleSource + ?Sized,
    {
        let (unique, duplicates) = self.dedupe(observed)?;

        let mut kept = Vec::new();
        let mut fresh = Vec::new();
        for track in &unique {
            match previous.find(track) {
                Some(existing) => kept.push(existing.clone()),
                None => fresh.push(track),
            }
        }

        let gone: Vec<&Track> = previous
            .iter()
            .filter(|t| identity::find(&unique, t).is_none())
            .collect();

        let mut removed = Vec::with_capacity(gone.len());
        for track in gone {
            let plays = lookup_plays(scrobbles, track)?;
            // Not clamped: a source that under-reports yields a negative count,
            // and that is recorded as-is.
            let since_added = plays.len() as PlayCount - track.playcount;

            let mut out = track.clone();
            out.playcount = since_added;
            out.date_out = Some(today);
            removed.push(out);
        }

        let cutoff = today.yesterday_cutoff();
        let mut added = Vec::with_capacity(fresh.len());
        for track in fresh {
            let plays = lookup_plays(scrobbles, track)?;
            let before_added = plays.iter().filter(|p| p.timestamp < cutoff).count();

            let mut out = track.clone();
            out.playcount = before_added as PlayCount;
            out.date_in = Some(today);
            out.date_out = None;
            added.push(out);
        }

        let snapshot = Snapshot::from_tracks(kept.iter().chain(added.iter()).cloned());
        let summary = summarize(&removed, &added);

        Ok(Reconciliation {
            snapshot,
            kept,
            added,
            removed,
            duplicates,
            summary,
        })
    }

    /// Split `observed` into first occurrences and later repeats.
    fn dedupe(&self, observed: &[Track]) -> Result<(Vec<Track>, Vec<Track>)> {
        let mut unique: Vec<Track> = Vec::with_capacity(observed.len());
        let mut duplicates = Vec::new();

        for track in observed {
            if identity::find(&unique, track).is_none() {
                unique.push(track.clone());
                continue;
            }
            match self.policy {
                DuplicatePolicy::Collapse => duplicates.push(track.clone()),
                DuplicatePolicy::Reject => {
                    return Err(RollingError::DuplicateTrack(describe(track)));
                }
            }
        }

        Ok((unique, duplicates))
    }
}

fn describe(track: &Track) -> String {
    format!(
        "{:?} by {} on {:?}",
        track.name,
        super::format_artists(&track.artists),
        track.album
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayEvent;
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn today() -> LogDate {
        LogDate::from_ymd(2024, 6, 10).unwrap()
    }

    fn track(name: &str) -> Track {
        Track::new(name, ["Artist"], "Album")
    }

    /// Scrobble source backed by a map from track name to timestamps.
    struct FakeScrobbles {
        plays: HashMap<String, Vec<i64>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeScrobbles {
        fn new(entries: &[(&str, Vec<i64>)]) -> Self {
            Self {
                plays: entries
                    .iter()
                    .map(|(name, ts)| (name.to_string(), ts.clone()))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ScrobbleSource for FakeScrobbles {
        fn scrobbles(&self, _artist: &str, name: &str) -> Result<Vec<PlayEvent>> {
            self.calls.borrow_mut().push(name.to_string());
            Ok(self
                .plays
                .get(name)
                .map(|ts| ts.iter().copied().map(PlayEvent::at).collect())
                .unwrap_or_default())
        }
    }

    #[test]
    fn test_exchange_counts_plays() {
        let cutoff = today().yesterday_cutoff();
        let previous = Snapshot::from_tracks(vec![track("A").with_playcount(5)]);
        let source = FakeScrobbles::new(&[
            ("A", vec![1, 2, 3, 4, 5, 6, 7, 8]),
            ("B", vec![cutoff - 100, cutoff - 1, cutoff, cutoff + 3600]),
        ]);

        let result = Reconciler::new()
            .reconcile(&[track("B")], &previous, &source, today())
            .unwrap();

        assert_eq!(result.removed.len(), 1);
        assert_eq!(result.removed[0].playcount, 3);
        assert_eq!(result.removed[0].date_out, Some(today()));
        assert_eq!(result.added.len(), 1);
        assert_eq!(result.added[0].playcount, 2);
        assert_eq!(result.added[0].date_in, Some(today()));
        assert!(result.kept.is_empty());
        assert_eq!(result.snapshot.tracks(), result.added.as_slice());
        assert_eq!(
            result.summary,
            "[-] A by ['Artist'], 3 plays since added\n[+] B by ['Artist']\n"
        );
        assert!(result.is_balanced());
    }

    #[test]
    fn test_unchanged_playlist_is_a_no_op() {
        let previous = Snapshot::from_tracks(vec![
            track("A").with_playcount(2),
            track("B").with_playcount(4),
        ]);
        let source = FakeScrobbles::new(&[]);

        let result = Reconciler::new()
            .reconcile(&[track("A"), track("B")], &previous, &source, today())
            .unwrap();

        assert_eq!(result.snapshot, previous);
        assert!(result.added.is_empty());
        assert!(result.removed.is_empty());
        assert_eq!(result.summary, "");
        assert!(!result.has_changes());
        assert!(source.calls.borrow().is_empty());
    }

    #[test]
    fn test_kept_tracks_keep_previous_record() {
        let original = track("A")
            .with_playcount(9)
            .with_date_in(LogDate::from_ymd(2024, 1, 1).unwrap());
        let previous = Snapshot::from_tracks(vec![original.clone()]);
        let source = FakeScrobbles::new(&[]);

        let result = Reconciler::new()
            .reconcile(&[track("A"), track("C")], &previous, &source, today())
            .unwrap();

        assert_eq!(result.kept, vec![original.clone()]);
        assert_eq!(result.snapshot.tracks()[0], original);
        assert_eq!(result.snapshot.tracks()[1].name, "C");
        assert!(!result.is_balanced());
    }

    #[test]
    fn test_negative_count_passes_through() {
        let previous = Snapshot::from_tracks(vec![track("A").with_playcount(10)]);
        let source = FakeScrobbles::new(&[("A", vec![1, 2])]);

        let result = Reconciler::new()
            .reconcile(&[], &previous, &source, today())
            .unwrap();

        assert_eq!(result.removed[0].playcount, -8);
        assert!(result.summary.contains("-8 plays since added"));
    }

    #[test]
    fn test_first_run_adds_everything() {
        let source = FakeScrobbles::new(&[("A", vec![0])]);

        let result = Reconciler::new()
            .reconcile(&[track("A"), track("B")], &Snapshot::new(), &source, today())
            .unwrap();

        assert_eq!(result.added.len(), 2);
        assert_eq!(result.added[0].playcount, 1);
        assert_eq!(result.added[1].playcount, 0);
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_duplicates_collapse_by_default() {
        let source = FakeScrobbles::new(&[]);
        let observed = vec![track("A"), track("B"), track("A")];

        let result = Reconciler::new()
            .reconcile(&observed, &Snapshot::new(), &source, today())
            .unwrap();

        assert_eq!(result.added.len(), 2);
        assert_eq!(result.duplicates, vec![track("A")]);
        assert_eq!(*source.calls.borrow(), vec!["A", "B"]);
    }

    #[test]
    fn test_duplicates_rejected_before_lookup() {
        let source = FakeScrobbles::new(&[]);
        let observed = vec![track("A"), track("A")];

        let result = Reconciler::with_policy(DuplicatePolicy::Reject).reconcile(
            &observed,
            &Snapshot::new(),
            &source,
            today(),
        );

        assert!(matches!(result, Err(RollingError::DuplicateTrack(_))));
        assert!(source.calls.borrow().is_empty());
    }

    #[test]
    fn test_lookup_failure_aborts() {
        let previous = Snapshot::from_tracks(vec![track("A")]);
        let failing = |artist: &str, name: &str| -> Result<Vec<PlayEvent>> {
            Err(RollingError::Lookup {
                artist: artist.to_string(),
                track: name.to_string(),
                reason: "service unavailable".into(),
            })
        };

        let result = Reconciler::new().reconcile(&[], &previous, &failing, today());
        assert!(matches!(result, Err(RollingError::Lookup { .. })));
    }

    #[test]
    fn test_lookup_uses_first_artist_and_name() {
        let queried: RefCell<Vec<(String, String)>> = RefCell::new(Vec::new());
        let recording = |artist: &str, name: &str| -> Result<Vec<PlayEvent>> {
            queried
                .borrow_mut()
                .push((artist.to_string(), name.to_string()));
            Ok(Vec::new())
        };
        let previous = Snapshot::from_tracks(vec![Track::new("Old", ["C", "D"], "Album")]);
        let observed = vec![Track::new("New", ["A", "B"], "Album")];

        Reconciler::new()
            .reconcile(&observed, &previous, &recording, today())
            .unwrap();

        assert_eq!(
            *queried.borrow(),
            vec![
                ("C".to_string(), "Old".to_string()),
                ("A".to_string(), "New".to_string()),
            ]
        );
    }

    #[test]
    fn test_track_without_artists_is_invalid() {
        let source = FakeScrobbles::new(&[]);
        let nameless = Track::new("A", Vec::<String>::new(), "Album");

        let result = Reconciler::new().reconcile(&[nameless], &Snapshot::new(), &source, today());
        assert!(matches!(result, Err(RollingError::InvalidTrack(_))));
    }
}
