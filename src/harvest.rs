//! One complete run: open the browser, load the target page, download every
//! PDF it links to, close the browser.

use tracing::info;

use crate::config::Settings;
use crate::error::SessionError;
use crate::services::DownloadSummary;

/// Run the harvest described by `settings`.
///
/// Only browser setup is fatal; per-link problems end up in the summary.
#[cfg(feature = "browser")]
pub async fn harvest(settings: &Settings) -> Result<DownloadSummary, SessionError> {
    use crate::browser::BrowserSession;
    use crate::services::download_pdfs;

    let mut download_config = settings.download_config();
    let session = BrowserSession::open(&settings.browser, &download_config.download_dir).await?;
    download_config.download_dir = session.download_dir().to_path_buf();

    session
        .navigate(&settings.target_url, settings.timing.page_load_timeout())
        .await;
    tokio::time::sleep(settings.timing.page_settle()).await;

    let summary = download_pdfs(session.page(), &download_config).await;

    session.close().await;

    info!(
        "Harvest finished: {} links, {} attempted, {} renamed, {} skipped, {} failed",
        summary.discovered, summary.attempted, summary.renamed, summary.skipped, summary.failed
    );
    Ok(summary)
}

#[cfg(not(feature = "browser"))]
pub async fn harvest(settings: &Settings) -> Result<DownloadSummary, SessionError> {
    info!("Cannot harvest {}: browser support missing", settings.target_url);
    Err(SessionError::NotCompiled)
}
