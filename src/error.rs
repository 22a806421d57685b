//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to bring up a browser session. Always fatal for a run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to prepare download directory {path}: {source}")]
    DownloadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to prepare browser profile: {0}")]
    Profile(String),
    #[error("Could not start a browser (primary: {primary}; fallback: {fallback})")]
    Provision { primary: String, fallback: String },
    #[error("Browser setup failed: {0}")]
    Setup(#[from] BrowserError),
    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    NotCompiled,
}

/// Errors reported by the browser control channel.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("DevTools protocol error: {0}")]
    Cdp(String),
    #[error("Script evaluation failed: {0}")]
    Script(String),
    #[error("Element is no longer attached to the page")]
    StaleElement,
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("Invalid selector {0}")]
    Selector(String),
}

impl BrowserError {
    /// Classify a raw DevTools error message.
    pub fn from_cdp_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("no node with given id")
            || lower.contains("could not find node")
            || lower.contains("node is detached")
            || lower.contains("cannot find context with specified id")
        {
            Self::StaleElement
        } else {
            Self::Cdp(message)
        }
    }
}

/// Per-link failure inside the download loop. Never aborts the batch.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Link is stale")]
    Stale,
    #[error("Browser error: {0}")]
    Browser(BrowserError),
}

impl From<BrowserError> for DownloadError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::StaleElement => Self::Stale,
            other => Self::Browser(other),
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
