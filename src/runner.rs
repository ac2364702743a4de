//! Run orchestration tying the sources, snapshot and log together.

use crate::config::RunConfig;
use crate::error::{Result, RollingError};
use crate::history::HistoryLog;
use crate::reconcile::{lookup_plays, Reconciler, Reconciliation};
use crate::snapshot::SnapshotStore;
use crate::sources::{Clock, Notifier, PlaylistSource, ScrobbleSource};
use crate::types::{PlayCount, Track};
use fs2::FileExt;
use std::fs::{self, File};
use tracing::{debug, info, warn};

/// What a single run did.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub reconciliation: Reconciliation,

    /// The log did not exist and its genesis entry was written this run.
    pub genesis_written: bool,

    /// A diff entry was appended to the log.
    pub diff_logged: bool,

    /// A notification was delivered.
    pub notified: bool,
}

/// Result of a finalize pass.
#[derive(Clone, Debug)]
pub struct FinalizeReport {
    /// Current snapshot tracks with plays accrued since each was added.
    pub tracks: Vec<Track>,

    /// Number of entries in the reformatted log.
    pub entries: usize,
}

/// One reconciliation pass per call to [`Runner::run`].
///
/// A lock file in the data directory keeps two runs (or a run and a
/// finalize) from touching the snapshot and log at the same time.
pub struct Runner {
    config: RunConfig,
    playlist: Box<dyn PlaylistSource>,
    scrobbles: Box<dyn ScrobbleSource>,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
    snapshots: SnapshotStore,
    log: HistoryLog,
}

impl Runner {
    pub fn new(
        config: RunConfig,
        playlist: impl PlaylistSource + 'static,
        scrobbles: impl ScrobbleSource + 'static,
        notifier: impl Notifier + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        let snapshots = SnapshotStore::new(config.snapshot_path());
        let log = HistoryLog::new(config.log_path());

        Self {
            config,
            playlist: Box::new(playlist),
            scrobbles: Box::new(scrobbles),
            notifier: Box::new(notifier),
            clock: Box::new(clock),
            snapshots,
            log,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn log(&self) -> &HistoryLog {
        &self.log
    }

    /// Fetch, reconcile, persist the snapshot, log the diff and notify.
    ///
    /// The snapshot is saved even when the exchange is unbalanced and no
    /// diff entry gets logged.
    pub fn run(&self) -> Result<RunReport> {
        let _lock = self.acquire_lock()?;
        let today = self.clock.today();

        let observed = self.playlist.fetch_tracklist()?;
        debug!(tracks = observed.len(), "fetched live tracklist");

        let previous = self.snapshots.load()?;
        if previous.is_empty() {
            debug!("no previous tracklist stored, every track counts as new");
        }

        let reconciler = Reconciler::with_policy(self.config.duplicate_policy);
        let outcome = reconciler.reconcile(&observed, &previous, self.scrobbles.as_ref(), today)?;

        if !outcome.duplicates.is_empty() {
            warn!(
                duplicates = outcome.duplicates.len(),
                "live tracklist repeats tracks; keeping the first of each"
            );
        }

        self.snapshots.save(&outcome.snapshot)?;

        let genesis_written = self.log.create_if_absent(outcome.snapshot.tracks(), today)?;
        if genesis_written {
            info!(path = %self.log.path().display(), "created history log");
        }

        let diff_logged = self.log.append(&outcome.removed, &outcome.added, today)?;
        if outcome.has_changes() && !diff_logged {
            debug!(
                removed = outcome.removed.len(),
                added = outcome.added.len(),
                "exchange is unbalanced, diff not logged"
            );
        }

        let notified = self.report(&outcome.summary);

        Ok(RunReport {
            reconciliation: outcome,
            genesis_written,
            diff_logged,
            notified,
        })
    }

    /// Refresh play counts for the current tracks and write a pretty-printed
    /// copy of the log to `out_filename` in the data directory.
    ///
    /// The live log and the snapshot are left as they are.
    pub fn finalize(&self, out_filename: &str) -> Result<FinalizeReport> {
        let _lock = self.acquire_lock()?;

        let snapshot = self.snapshots.load()?;
        let mut tracks = Vec::with_capacity(snapshot.len());
        for track in &snapshot {
            let plays = lookup_plays(self.scrobbles.as_ref(), track)?;
            let mut refreshed = track.clone();
            refreshed.playcount = plays.len() as PlayCount - track.playcount;
            tracks.push(refreshed);
        }

        let out = self.config.data_dir.join(out_filename);
        let entries = self.log.finalize_to(&out)?;
        info!(path = %out.display(), entries, "wrote finalized log");

        Ok(FinalizeReport { tracks, entries })
    }

    /// Log the summary and hand it to the notifier. Delivery failures are
    /// logged, never returned.
    fn report(&self, summary: &str) -> bool {
        if summary.is_empty() {
            return false;
        }

        if self.config.verbose {
            info!("{}", summary.trim_end());
        } else {
            debug!("{}", summary.trim_end());
        }

        match self.notifier.notify(&self.config.notify_subject, summary) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to send notification");
                false
            }
        }
    }

    fn acquire_lock(&self) -> Result<File> {
        fs::create_dir_all(&self.config.data_dir)?;
        let lock_file = File::create(self.config.lock_path())?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| RollingError::Locked)?;

        Ok(lock_file)
    }
}
