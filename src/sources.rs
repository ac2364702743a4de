//! Collaborators the reconciliation core consumes.
//!
//! Playlist fetching, scrobble history and notification delivery live
//! outside this crate; these traits are the seams they plug into. Closures
//! implement the source traits so callers and tests can pass plain functions.

use crate::error::Result;
use crate::types::{LogDate, PlayEvent, Track};
use chrono::Utc;

/// Producer of the live playlist contents.
pub trait PlaylistSource {
    /// Every track currently on the playlist, in playlist order.
    fn fetch_tracklist(&self) -> Result<Vec<Track>>;
}

impl<F> PlaylistSource for F
where
    F: Fn() -> Result<Vec<Track>>,
{
    fn fetch_tracklist(&self) -> Result<Vec<Track>> {
        self()
    }
}

/// Play history for a track.
pub trait ScrobbleSource {
    /// All recorded plays of `track_name` by `primary_artist`.
    fn scrobbles(&self, primary_artist: &str, track_name: &str) -> Result<Vec<PlayEvent>>;
}

impl<F> ScrobbleSource for F
where
    F: Fn(&str, &str) -> Result<Vec<PlayEvent>>,
{
    fn scrobbles(&self, primary_artist: &str, track_name: &str) -> Result<Vec<PlayEvent>> {
        self(primary_artist, track_name)
    }
}

/// Best-effort delivery of run summaries to the operator.
pub trait Notifier {
    fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

/// Notifier that writes the message to the `tracing` output.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<()> {
        tracing::info!(subject, "{}", body.trim_end());
        Ok(())
    }
}

/// Source of the current date.
pub trait Clock {
    fn today(&self) -> LogDate;
}

/// Current UTC calendar date, matching the UTC midnight used by
/// [`LogDate::yesterday_cutoff`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> LogDate {
        LogDate(Utc::now().date_naive())
    }
}

/// Clock pinned to a single date.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub LogDate);

impl Clock for FixedClock {
    fn today(&self) -> LogDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_reports_utc_date() {
        let before = Utc::now().date_naive();
        let today = SystemClock.today();
        let after = Utc::now().date_naive();

        assert!(today.0 == before || today.0 == after);
    }
}
