//! # Rolling Log
//!
//! Keeps a history of a curated "rolling" playlist: every run snapshots the
//! playlist, diffs it against the previous snapshot and records what left
//! and what came in, with listen counts taken from a scrobble service.
//!
//! ## Core Concepts
//!
//! - **Track identity**: name, ordered artist list and album
//! - **Snapshot**: tracks currently on the playlist with their play counts
//! - **Reconciler**: kept / added / removed partition plus play accounting
//! - **History log**: a JSON array holding a genesis entry and one diff per
//!   balanced exchange, appended in place
//!
//! ## Example
//!
//! ```ignore
//! use rolling_log::{Runner, RunConfig, SystemClock, TracingNotifier};
//!
//! let config = RunConfig::load("config/config.json")?;
//! let runner = Runner::new(config, fetch_playlist, lastfm_scrobbles, TracingNotifier, SystemClock);
//! let report = runner.run()?;
//! println!("{}", report.reconciliation.summary);
//! ```

pub mod config;
pub mod error;
mod fsio;
pub mod history;
pub mod identity;
pub mod reconcile;
pub mod runner;
pub mod snapshot;
pub mod sources;
pub mod types;

// Re-exports
pub use config::RunConfig;
pub use error::{Result, RollingError};
pub use history::{truncate_chars, HistoryLog};
pub use identity::{find, same_track};
pub use reconcile::{DuplicatePolicy, Reconciler, Reconciliation};
pub use runner::{FinalizeReport, RunReport, Runner};
pub use snapshot::{Snapshot, SnapshotStore};
pub use sources::{Clock, FixedClock, Notifier, PlaylistSource, ScrobbleSource, SystemClock, TracingNotifier};
pub use types::*;
