//! PDF download service.
//!
//! Walks the discovered links in order, has the browser download each one
//! in its own tab, then renames the finished file with a sequence prefix.
//! A failure on one link is logged and the loop moves on.

mod driver;
mod finalize;
mod types;

use tracing::{debug, info, warn};

use crate::browser::BrowserPage;
use crate::discovery::extract::extract_url;
use crate::discovery::find_pdf_links;
use crate::error::{BrowserError, DownloadError};

pub use driver::{download, INTER_DOWNLOAD_DELAY, TAB_DWELL};
pub use finalize::{
    finalize, FinalizeConfig, FinalizeOutcome, MAX_POLLS, POLL_INTERVAL, RENAME_RETRY_DELAY,
};
pub use types::{DownloadConfig, DownloadRun, DownloadSequence, DownloadSummary};

/// Download every PDF linked from the page currently loaded in `page`.
pub async fn download_pdfs<P: BrowserPage>(page: &P, config: &DownloadConfig) -> DownloadSummary {
    let links = find_pdf_links(page).await;

    let mut run = DownloadRun::default();
    run.summary.discovered = links.len();

    if links.is_empty() {
        info!("No PDF links found on the page");
        return run.summary;
    }

    info!("Starting to download {} PDFs...", links.len());

    let page_url = page.current_url().await.unwrap_or_else(|e| {
        debug!("Could not read page URL: {}", e);
        None
    });

    for (index, link) in links.iter().enumerate() {
        let position = index + 1;

        let candidate = match extract_url(&link.element, page_url.as_deref()).await {
            Ok(Some(candidate)) => candidate,
            Ok(None) => {
                warn!("Could not extract URL from link #{}", position);
                run.summary.skipped += 1;
                continue;
            }
            Err(BrowserError::StaleElement) => {
                warn!("Link #{} is stale, skipping...", position);
                run.summary.failed += 1;
                continue;
            }
            Err(e) => {
                warn!("Error processing link #{}: {}", position, e);
                run.summary.failed += 1;
                continue;
            }
        };

        let sequence = run.sequence.next();
        run.summary.attempted = sequence;
        info!("Downloading PDF #{} from: {}", sequence, candidate.url);

        match download(page, &candidate.url, config.tab_dwell).await {
            Ok(()) => {
                if let FinalizeOutcome::Renamed(_) =
                    finalize(&config.download_dir, sequence, &config.finalize).await
                {
                    run.summary.renamed += 1;
                }
                tokio::time::sleep(config.inter_download_delay).await;
            }
            Err(DownloadError::Stale) => {
                warn!("Link #{} is stale, skipping...", position);
                run.summary.failed += 1;
            }
            Err(e) => {
                warn!("Error downloading PDF #{}: {}", sequence, e);
                run.summary.failed += 1;
            }
        }
    }

    run.summary
}
