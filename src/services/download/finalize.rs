//! Rename a finished download with its sequence prefix.
//!
//! The browser writes into the download directory asynchronously, so the
//! newest PDF is polled until its in-progress marker disappears. Selection
//! is "newest file in the directory", which is only correct while one
//! download is in flight at a time.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::storage::{self, DownloadedFile, FileState};

/// Delay between checks of an in-progress download.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Checks before giving up on an in-progress download.
pub const MAX_POLLS: u32 = 30;

/// Delay before the single retry of a rename blocked by a file lock.
pub const RENAME_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Polling cadence for [`finalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeConfig {
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub rename_retry_delay: Duration,
}

impl Default for FinalizeConfig {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            max_polls: MAX_POLLS,
            rename_retry_delay: RENAME_RETRY_DELAY,
        }
    }
}

/// What [`finalize`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// No PDF or partial PDF in the directory.
    NoCandidates,
    /// The newest file never lost its in-progress marker; left untouched.
    StillInProgress(PathBuf),
    /// Renamed to the given path.
    Renamed(PathBuf),
    /// Rename failed; the file was left under its original name.
    RenameFailed(PathBuf),
}

fn newest(dir: &Path) -> Option<DownloadedFile> {
    match storage::newest_candidate(dir) {
        Ok(file) => file,
        Err(e) => {
            warn!("Error listing {}: {}", dir.display(), e);
            None
        }
    }
}

/// Wait for the newest download to complete and prefix it with `sequence`.
///
/// Never fails: every problem is logged and reported in the outcome.
pub async fn finalize(dir: &Path, sequence: u32, config: &FinalizeConfig) -> FinalizeOutcome {
    let Some(mut latest) = newest(dir) else {
        info!("No PDF files found in download directory");
        return FinalizeOutcome::NoCandidates;
    };

    if latest.state == FileState::InProgress {
        info!("File is still downloading, waiting...");
        for _ in 0..config.max_polls {
            tokio::time::sleep(config.poll_interval).await;
            if let Some(file) = newest(dir) {
                latest = file;
                if latest.state == FileState::Complete {
                    break;
                }
            }
        }
    }

    if latest.state == FileState::InProgress {
        warn!("Download is taking too long, skipping renaming");
        return FinalizeOutcome::StillInProgress(latest.path);
    }

    rename_with_retry(
        &latest,
        dir,
        sequence,
        config.rename_retry_delay,
        |from, to| tokio::fs::rename(from, to),
    )
    .await
}

/// Rename `file` to its sequenced name, retrying once after `retry_delay`
/// when the file is locked.
async fn rename_with_retry<R, F>(
    file: &DownloadedFile,
    dir: &Path,
    sequence: u32,
    retry_delay: Duration,
    rename: R,
) -> FinalizeOutcome
where
    R: Fn(PathBuf, PathBuf) -> F,
    F: Future<Output = std::io::Result<()>>,
{
    let new_name = storage::sequenced_name(sequence, &file.name);
    let new_path = dir.join(&new_name);

    let result = match rename(file.path.clone(), new_path.clone()).await {
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            warn!("File is being used by another process, waiting...");
            tokio::time::sleep(retry_delay).await;
            rename(file.path.clone(), new_path.clone())
                .await
                .map_err(|e| format!("Could not rename file after waiting: {}", e))
        }
        other => other.map_err(|e| format!("Error renaming file: {}", e)),
    };

    match result {
        Ok(()) => {
            info!("Renamed to: {}", new_name);
            FinalizeOutcome::Renamed(new_path)
        }
        Err(message) => {
            warn!("{}", message);
            FinalizeOutcome::RenameFailed(file.path.clone())
        }
    }
}
