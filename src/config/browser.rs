//! Browser engine configuration types.
//!
//! These live outside `#[cfg(feature = "browser")]` so config parsing works
//! in builds without the browser feature.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Browser engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit Chrome/Chromium executable. Skips auto-detection.
    /// Can also be set via CHROME_PATH environment variable.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// Used as the fallback when no local browser can be launched.
    /// Can also be set via BROWSER_URL environment variable.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// DevTools request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            chrome_path: None,
            chrome_args: Vec::new(),
            remote_url: None,
            timeout: default_timeout(),
        }
    }
}

impl BrowserEngineConfig {
    /// Apply environment variable overrides.
    ///
    /// - `BROWSER_URL` - Remote Chrome DevTools URL
    /// - `CHROME_PATH` - Chrome/Chromium executable
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("BROWSER_URL").filter(|v| !v.is_empty()) {
            self.remote_url = Some(val);
        }

        if let Some(val) = lookup("CHROME_PATH").filter(|v| !v.is_empty()) {
            self.chrome_path = Some(PathBuf::from(val));
        }

        self
    }
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_engine_config_default() {
        let config = BrowserEngineConfig::default();
        assert!(config.headless);
        assert!(config.chrome_path.is_none());
        assert!(config.chrome_args.is_empty());
        assert!(config.remote_url.is_none());
        assert_eq!(config.timeout, 30);
    }

    #[test]
    fn test_browser_engine_config_serde_defaults() {
        let config: BrowserEngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BrowserEngineConfig::default());
    }

    #[test]
    fn test_browser_engine_config_serde_with_values() {
        let json = r#"{
            "headless": false,
            "chrome_path": "/opt/chrome/chrome",
            "chrome_args": ["--lang=en-US"],
            "remote_url": "ws://localhost:9222",
            "timeout": 60
        }"#;

        let config: BrowserEngineConfig = serde_json::from_str(json).unwrap();
        assert!(!config.headless);
        assert_eq!(config.chrome_path, Some(PathBuf::from("/opt/chrome/chrome")));
        assert_eq!(config.chrome_args, vec!["--lang=en-US"]);
        assert_eq!(config.remote_url.as_deref(), Some("ws://localhost:9222"));
        assert_eq!(config.timeout, 60);
    }

    #[test]
    fn test_env_overrides() {
        let config = BrowserEngineConfig::default().with_overrides_from(|key| match key {
            "BROWSER_URL" => Some("ws://chrome:9222".to_string()),
            "CHROME_PATH" => Some("/usr/bin/chromium".to_string()),
            _ => None,
        });

        assert_eq!(config.remote_url.as_deref(), Some("ws://chrome:9222"));
        assert_eq!(config.chrome_path, Some(PathBuf::from("/usr/bin/chromium")));
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = BrowserEngineConfig {
            remote_url: Some("ws://configured:9222".into()),
            ..Default::default()
        }
        .with_overrides_from(|_| Some(String::new()));

        assert_eq!(config.remote_url.as_deref(), Some("ws://configured:9222"));
        assert!(config.chrome_path.is_none());
    }
}
