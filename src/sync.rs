//! Reconciles the remote track list against the target directory.
//!
//! The directory listing is the only sync state: a track is "synced" when a
//! file named after its normalized key exists with the configured extension.
//! The reconciler only ever adds files, never overwrites or deletes.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use futures::stream::{self, StreamExt};
use snafu::prelude::*;

use crate::downloader::{AudioFormat, Fetch};
use crate::normalize;
use crate::{Track, TrackKey};

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Cannot access sync directory {path}: {message}"))]
    DirectoryAccess { path: String, message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Per-run configuration, built once by the cli and threaded through.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub dir: PathBuf,
    pub format: AudioFormat,
    pub jobs: usize,
}

pub struct Reconciler {
    config: SyncConfig,
}

/// The directory must exist or be creatable up front, before any listing or
/// download work starts.
pub fn new(config: SyncConfig) -> Result<Reconciler> {
    fs::create_dir_all(&config.dir).map_err(|error| Error::DirectoryAccess {
        path: config.dir.display().to_string(),
        message: error.to_string(),
    })?;

    Ok(Reconciler { config })
}

impl Reconciler {
    /// Scan the directory for files with the configured extension and build
    /// the set of normalized keys. Read-only; partial downloads (`.part`,
    /// `.ytdl`) have a different extension and are left out, so their tracks
    /// are retried on the next run.
    pub fn local_keys(&self) -> Result<HashSet<TrackKey>> {
        let entries = fs::read_dir(&self.config.dir).map_err(|error| Error::DirectoryAccess {
            path: self.config.dir.display().to_string(),
            message: error.to_string(),
        })?;

        let extension = self.config.format.extension();
        let mut keys = HashSet::new();

        for entry in entries {
            let entry = entry.map_err(|error| Error::DirectoryAccess {
                path: self.config.dir.display().to_string(),
                message: error.to_string(),
            })?;

            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.insert(normalize::key(stem));
            }
        }

        Ok(keys)
    }

    /// The subset of tracks with no matching local key, in playlist order.
    pub fn plan(&self, tracks: &[Track], local: &HashSet<TrackKey>) -> Vec<Track> {
        tracks
            .iter()
            .filter(|track| {
                if local.contains(&normalize::track_key(track)) {
                    debug!("'{}' already exists", track.title);
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect::<Vec<Track>>()
    }

    pub fn output_path(&self, track: &Track) -> PathBuf {
        let key = normalize::track_key(track);

        self.config.dir.join(format!(
            "{}.{}",
            key.as_str(),
            self.config.format.extension()
        ))
    }

    /// Attempt every missing track once. A failed track is recorded and the
    /// batch moves on; nothing here aborts the run. `on_done` fires after
    /// each attempt, from the driving task.
    pub async fn run<F>(
        &self,
        fetcher: &F,
        missing: Vec<Track>,
        mut on_done: impl FnMut(&Track, bool),
    ) -> SyncSummary
    where
        F: Fetch + Sync,
    {
        let jobs = self.config.jobs.max(1);
        let mut summary = SyncSummary::default();

        let mut downloads = stream::iter(missing.into_iter().map(|track| {
            let dest = self.output_path(&track);

            async move {
                let result = fetcher.fetch(&track, &dest).await;
                (track, result)
            }
        }))
        .buffer_unordered(jobs);

        while let Some((track, result)) = downloads.next().await {
            match result {
                Ok(()) => {
                    debug!("downloaded '{}'", track.title);
                    summary.synced.push(track.title.clone());
                    on_done(&track, true);
                }
                Err(error) => {
                    warn!("failed to download '{}': {error}", track.title);
                    summary.failed.push(FailedTrack {
                        title: track.title.clone(),
                        reason: error.to_string(),
                    });
                    on_done(&track, false);
                }
            }
        }

        summary
    }
}

#[derive(Debug)]
pub struct FailedTrack {
    pub title: String,
    pub reason: String,
}

#[derive(Default, Debug)]
pub struct SyncSummary {
    pub synced: Vec<String>,
    pub skipped: usize,
    pub failed: Vec<FailedTrack>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Partial,
    NoOp,
}

impl SyncSummary {
    pub fn outcome(&self) -> Outcome {
        if !self.failed.is_empty() {
            Outcome::Partial
        } else if self.synced.is_empty() {
            Outcome::NoOp
        } else {
            Outcome::Success
        }
    }
}
