//! Core types for the rolling playlist log.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accumulated play count. Signed: a removed track's count is
/// `scrobbles - count_when_added` and can go negative if the scrobble
/// source under-reports.
pub type PlayCount = i64;

/// Calendar date written to the snapshot and the log as `YYYY-MM-DD`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogDate(pub NaiveDate);

impl LogDate {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(LogDate)
    }

    /// Unix timestamp of 00:00:00 UTC on the day before this date.
    ///
    /// Plays at or after this instant are not credited to a newly added track.
    /// Dates are UTC calendar days throughout; [`crate::SystemClock`] reports
    /// the UTC date so the cutoff and the run date agree.
    pub fn yesterday_cutoff(&self) -> i64 {
        let yesterday = self.0.checked_sub_days(Days::new(1)).unwrap_or(self.0);
        yesterday
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or(i64::MIN)
    }
}

impl fmt::Debug for LogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogDate({})", self)
    }
}

impl fmt::Display for LogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for LogDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, Self::FORMAT).map(LogDate)
    }
}

/// A single scrobble of a track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEvent {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl PlayEvent {
    pub fn at(timestamp: i64) -> Self {
        Self { timestamp }
    }
}

/// A track on the playlist together with its accounting fields.
///
/// Identity is `(name, artists, album)`, see [`crate::identity::same_track`].
/// The derived `PartialEq` compares every field, accounting included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,

    /// Artist names in the order the playlist source lists them.
    pub artists: Vec<String>,

    pub album: String,

    /// Plays accrued since the track was added.
    #[serde(default)]
    pub playcount: PlayCount,

    /// Date the track was first seen on the playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_in: Option<LogDate>,

    /// Date the track was seen to have left the playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_out: Option<LogDate>,
}

impl Track {
    /// A track as observed on the live playlist, with no accounting yet.
    pub fn new(
        name: impl Into<String>,
        artists: impl IntoIterator<Item = impl Into<String>>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            artists: artists.into_iter().map(Into::into).collect(),
            album: album.into(),
            playcount: 0,
            date_in: None,
            date_out: None,
        }
    }

    pub fn with_playcount(mut self, playcount: PlayCount) -> Self {
        self.playcount = playcount;
        self
    }

    pub fn with_date_in(mut self, date: LogDate) -> Self {
        self.date_in = Some(date);
        self
    }

    /// First listed artist, used as the scrobble lookup key.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }

    /// Log projection without the play count.
    pub fn to_logged(&self) -> LoggedTrack {
        LoggedTrack {
            name: self.name.clone(),
            artists: self.artists.clone(),
            album: self.album.clone(),
            playcount: None,
            date_in: self.date_in,
            date_out: self.date_out,
        }
    }

    /// Log projection keeping the final play count.
    pub fn to_logged_with_count(&self) -> LoggedTrack {
        LoggedTrack {
            playcount: Some(self.playcount),
            ..self.to_logged()
        }
    }
}

/// A track as it appears inside a log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedTrack {
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playcount: Option<PlayCount>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_in: Option<LogDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_out: Option<LogDate>,
}

/// One element of the history log array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogEntry {
    /// Written once, when the log file is created.
    Genesis {
        date: LogDate,
        starting_tracks: Vec<LoggedTrack>,
    },

    /// A balanced exchange of removed and added tracks.
    Diff {
        date: LogDate,
        removed: Vec<LoggedTrack>,
        added: Vec<LoggedTrack>,
    },
}

impl LogEntry {
    pub fn genesis(date: LogDate, tracks: &[Track]) -> Self {
        LogEntry::Genesis {
            date,
            starting_tracks: tracks.iter().map(Track::to_logged).collect(),
        }
    }

    pub fn diff(date: LogDate, removed: &[Track], added: &[Track]) -> Self {
        LogEntry::Diff {
            date,
            removed: removed.iter().map(Track::to_logged_with_count).collect(),
            added: added.iter().map(Track::to_logged).collect(),
        }
    }

    pub fn date(&self) -> LogDate {
        match self {
            LogEntry::Genesis { date, .. } | LogEntry::Diff { date, .. } => *date,
        }
    }
}
