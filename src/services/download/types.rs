//! Download service types.

use std::path::PathBuf;
use std::time::Duration;

use super::finalize::FinalizeConfig;

/// Sequence number used to prefix renamed files.
///
/// Advanced once per attempted download, before the attempt is made, so a
/// failed attempt leaves a gap in the output numbering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSequence(u32);

impl DownloadSequence {
    /// Advance and return the new value (the first call returns 1).
    pub fn next(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }
}

/// Result of a download run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Visible, de-duplicated links found on the page.
    pub discovered: usize,
    /// Links a download was attempted for (sequence numbers consumed).
    pub attempted: u32,
    /// Files renamed with their sequence prefix.
    pub renamed: usize,
    /// Links without a usable PDF URL.
    pub skipped: usize,
    /// Links whose extraction or download failed.
    pub failed: usize,
}

/// State threaded through the per-link loop.
#[derive(Debug, Default)]
pub struct DownloadRun {
    pub sequence: DownloadSequence,
    pub summary: DownloadSummary,
}

/// Configuration for the download loop.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub download_dir: PathBuf,
    /// Time spent in the download tab before closing it.
    pub tab_dwell: Duration,
    /// Pause between consecutive downloads.
    pub inter_download_delay: Duration,
    pub finalize: FinalizeConfig,
}
