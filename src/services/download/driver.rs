//! Single-link download through a throw-away tab.

use std::time::Duration;

use tracing::debug;

use crate::browser::{BrowserPage, BrowserTab};
use crate::error::{BrowserError, DownloadError};

/// Dwell in the download tab so the transfer can start.
pub const TAB_DWELL: Duration = Duration::from_secs(3);

/// Pause between downloads to avoid hammering the server.
pub const INTER_DOWNLOAD_DELAY: Duration = Duration::from_secs(2);

/// Open `url` in a new tab so the browser downloads it, then return to the
/// primary tab.
///
/// The tab is closed and focus restored even when navigation fails; the
/// first error is reported.
pub async fn download<P: BrowserPage>(
    page: &P,
    url: &str,
    dwell: Duration,
) -> Result<(), DownloadError> {
    let tab = page.open_tab().await?;

    let visit = async {
        tab.focus().await?;
        tab.navigate(url).await?;
        tokio::time::sleep(dwell).await;
        Ok::<(), BrowserError>(())
    }
    .await;

    let closed = tab.close().await;
    let refocused = page.focus().await;
    debug!("Download tab for {} closed", url);

    visit?;
    closed?;
    refocused?;
    Ok(())
}
