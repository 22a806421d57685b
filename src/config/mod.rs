//! Configuration for pdfsweep.
//!
//! Every field has a default, so running without a config file reproduces
//! the fixed target page and download directory. A `pdfsweep.toml` in the
//! working directory (or an explicit `--config` file) can override them.

pub mod browser;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::services::download::{DownloadConfig, FinalizeConfig};

pub use browser::BrowserEngineConfig;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "pdfsweep.toml";

/// Page whose PDF links are harvested.
pub const DEFAULT_TARGET_URL: &str =
    "https://www.nirfindia.org/Rankings/2024/EngineeringRanking.html";

/// Directory downloads land in, relative to the config file or CWD.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Page to scan for PDF links.
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Directory the browser downloads into and files are renamed in.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    #[serde(default)]
    pub browser: BrowserEngineConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            download_dir: default_download_dir(),
            browser: BrowserEngineConfig::default(),
            timing: TimingConfig::default(),
            source_path: None,
        }
    }
}

fn default_target_url() -> String {
    DEFAULT_TARGET_URL.to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DOWNLOAD_DIR)
}

/// Fixed waits used across a run, in seconds (polls are a count).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    /// Upper bound on waiting for the target page's ready state.
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout: u64,

    /// Extra wait after the target page loaded, for late scripts.
    #[serde(default = "default_page_settle")]
    pub page_settle: u64,

    /// Dwell in the download tab before closing it.
    #[serde(default = "default_tab_dwell")]
    pub tab_dwell: u64,

    /// Pause between consecutive downloads.
    #[serde(default = "default_inter_download_delay")]
    pub inter_download_delay: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    #[serde(default = "default_rename_retry_delay")]
    pub rename_retry_delay: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            page_load_timeout: default_page_load_timeout(),
            page_settle: default_page_settle(),
            tab_dwell: default_tab_dwell(),
            inter_download_delay: default_inter_download_delay(),
            poll_interval: default_poll_interval(),
            max_polls: default_max_polls(),
            rename_retry_delay: default_rename_retry_delay(),
        }
    }
}

fn default_page_load_timeout() -> u64 {
    20
}

fn default_page_settle() -> u64 {
    5
}

fn default_tab_dwell() -> u64 {
    crate::services::download::TAB_DWELL.as_secs()
}

fn default_inter_download_delay() -> u64 {
    crate::services::download::INTER_DOWNLOAD_DELAY.as_secs()
}

fn default_poll_interval() -> u64 {
    crate::services::download::POLL_INTERVAL.as_secs()
}

fn default_max_polls() -> u32 {
    crate::services::download::MAX_POLLS
}

fn default_rename_retry_delay() -> u64 {
    crate::services::download::RENAME_RETRY_DELAY.as_secs()
}

impl TimingConfig {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_secs(self.page_settle)
    }

    /// Finalizer polling cadence.
    pub fn finalize_config(&self) -> FinalizeConfig {
        FinalizeConfig {
            poll_interval: Duration::from_secs(self.poll_interval),
            max_polls: self.max_polls,
            rename_retry_delay: Duration::from_secs(self.rename_retry_delay),
        }
    }
}

impl Settings {
    /// Load settings from an explicit file, or from `pdfsweep.toml` in the
    /// working directory when present, falling back to defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match config_path {
            Some(path) => Self::load_from_path(path)?,
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                if candidate.exists() {
                    tracing::debug!("Found config file: {}", candidate.display());
                    Self::load_from_path(&candidate)?
                } else {
                    Self::default()
                }
            }
        };

        settings.browser = settings.browser.with_env_overrides();
        Ok(settings)
    }

    /// Load settings from a specific TOML file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut settings: Settings =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> PathBuf {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Download directory as an absolute path.
    pub fn resolved_download_dir(&self) -> PathBuf {
        if self.download_dir.is_absolute() {
            self.download_dir.clone()
        } else {
            self.base_dir().join(&self.download_dir)
        }
    }

    /// Settings for the per-link download loop.
    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            download_dir: self.resolved_download_dir(),
            tab_dwell: Duration::from_secs(self.timing.tab_dwell),
            inter_download_delay: Duration::from_secs(self.timing.inter_download_delay),
            finalize: self.timing.finalize_config(),
        }
    }
}
