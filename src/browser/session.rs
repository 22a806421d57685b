//! Browser session lifecycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::browser::BrowserConfigBuilder;
use chromiumoxide::handler::{Handler, HandlerConfig};
use chromiumoxide::{Browser, BrowserConfig};
use futures::{Stream, StreamExt};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::locate::find_chrome;
use super::page::ChromePage;
use super::profile::create_profile;
use crate::config::BrowserEngineConfig;
use crate::error::{BrowserError, SessionError};
use crate::storage::ensure_download_dir;

/// Chrome arguments applied to every launched browser.
const CHROME_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-blink-features=AutomationControlled",
];

/// A running browser configured to save PDFs into one directory.
pub struct BrowserSession {
    browser: Arc<Mutex<Browser>>,
    page: ChromePage,
    handler: JoinHandle<()>,
    download_dir: PathBuf,
    _profile: TempDir,
}

impl BrowserSession {
    /// Start a browser whose downloads land in `download_dir`.
    ///
    /// Launching a local Chrome is tried first; if that fails, a remote
    /// DevTools endpoint (when configured) or chromiumoxide's own executable
    /// detection is tried once before giving up.
    pub async fn open(
        config: &BrowserEngineConfig,
        download_dir: &Path,
    ) -> Result<Self, SessionError> {
        let download_dir =
            ensure_download_dir(download_dir).map_err(|source| SessionError::DownloadDir {
                path: download_dir.to_path_buf(),
                source,
            })?;

        let profile =
            create_profile(&download_dir).map_err(|e| SessionError::Profile(e.to_string()))?;

        let (browser, handler) = match launch_local(config, profile.path()).await {
            Ok(launched) => launched,
            Err(primary) => {
                warn!("Error starting Chrome: {:#}", primary);
                warn!("Falling back to secondary browser provisioning...");
                fallback(config, profile.path())
                    .await
                    .map_err(|fallback| SessionError::Provision {
                        primary: format!("{:#}", primary),
                        fallback: format!("{:#}", fallback),
                    })?
            }
        };

        let handler = spawn_handler(handler);

        let behavior = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(download_dir.to_string_lossy().to_string())
            .build()
            .map_err(|e| SessionError::Setup(BrowserError::Cdp(e)))?;
        browser
            .execute(behavior)
            .await
            .map_err(|e| SessionError::Setup(BrowserError::from_cdp_message(e.to_string())))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Setup(BrowserError::from_cdp_message(e.to_string())))?;

        let browser = Arc::new(Mutex::new(browser));
        let page = ChromePage::new(Arc::clone(&browser), page);

        info!("Browser ready, downloading into {}", download_dir.display());

        Ok(Self {
            browser,
            page,
            handler,
            download_dir,
            _profile: profile,
        })
    }

    /// The primary tab.
    pub fn page(&self) -> &ChromePage {
        &self.page
    }

    /// Absolute download directory.
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Load the page to scan.
    pub async fn navigate(&self, url: &str, timeout: Duration) {
        info!("Navigating to {}", url);
        self.page.load(url, timeout).await;
    }

    /// Shut the browser down. Errors are logged, never returned.
    pub async fn close(self) {
        {
            let mut browser = self.browser.lock().await;
            if let Err(e) = browser.close().await {
                warn!("Error closing browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Error waiting for browser exit: {}", e);
            }
        }
        self.handler.abort();
        info!("Browser closed");
    }
}

fn base_config(config: &BrowserEngineConfig, profile_dir: &Path) -> BrowserConfigBuilder {
    let mut builder = BrowserConfig::builder()
        .user_data_dir(profile_dir)
        .request_timeout(Duration::from_secs(config.timeout));

    // with_head means NOT headless
    if !config.headless {
        builder = builder.with_head();
    }

    for arg in CHROME_ARGS {
        builder = builder.arg(*arg);
    }
    for arg in &config.chrome_args {
        builder = builder.arg(arg);
    }

    builder
}

async fn launch(config: BrowserConfig) -> anyhow::Result<(Browser, Handler)> {
    Browser::launch(config)
        .await
        .context("Failed to launch browser")
}

/// Primary path: launch a located (or configured) Chrome executable.
async fn launch_local(
    config: &BrowserEngineConfig,
    profile_dir: &Path,
) -> anyhow::Result<(Browser, Handler)> {
    let chrome_path = find_chrome(config.chrome_path.as_deref())?;
    info!(
        "Launching browser {} (headless={})",
        chrome_path.display(),
        config.headless
    );

    let browser_config = base_config(config, profile_dir)
        .chrome_executable(chrome_path)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

    launch(browser_config).await
}

/// Secondary path: a remote DevTools endpoint, else chromiumoxide's own
/// executable detection.
async fn fallback(
    config: &BrowserEngineConfig,
    profile_dir: &Path,
) -> anyhow::Result<(Browser, Handler)> {
    if let Some(remote_url) = config.remote_url.as_deref() {
        return connect_remote(remote_url, config.timeout).await;
    }

    info!("Launching browser with default executable detection");
    let browser_config = base_config(config, profile_dir)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

    launch(browser_config).await
}

/// Connect to a remote Chrome instance.
async fn connect_remote(url: &str, timeout: u64) -> anyhow::Result<(Browser, Handler)> {
    info!(
        "Connecting to remote browser at {} (timeout: {}s)",
        url, timeout
    );

    // Get WebSocket URL from the /json/version endpoint
    let http_url = url
        .replace("ws://", "http://")
        .replace("wss://", "https://");
    let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .get(&version_url)
        .timeout(Duration::from_secs(timeout))
        .send()
        .await
        .context("Failed to connect to remote browser")?
        .json()
        .await
        .context("Failed to parse browser version info")?;

    let ws_url = resp
        .get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))?;

    info!("Connecting to WebSocket: {}", ws_url);
    warn!("Remote browser downloads land on the remote host's filesystem");

    let handler_config = HandlerConfig {
        request_timeout: Duration::from_secs(timeout),
        ..Default::default()
    };

    Browser::connect_with_config(ws_url, handler_config)
        .await
        .context("Failed to connect to remote browser")
}

/// Drive the DevTools event loop until the connection ends.
///
/// A message the protocol schema can't decode surfaces as an error item;
/// the stream stays usable, so it is logged and polling continues.
fn spawn_handler<S, T, E>(mut handler: S) -> JoinHandle<()>
where
    S: Stream<Item = Result<T, E>> + Unpin + Send + 'static,
    E: std::fmt::Display,
{
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("Browser handler error: {}", e);
            }
        }
        debug!("Browser handler stream ended");
    })
}
