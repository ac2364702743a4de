//! Append-only history log.
//!
//! The log is a single JSON array on disk: a genesis entry followed by one
//! diff entry per balanced exchange. Appends reseal the array in place so
//! the file stays valid JSON between runs.

mod log;
mod truncate;

pub use log::HistoryLog;
pub use truncate::truncate_chars;
