//! In-memory browser used by tests.
//!
//! Navigations are recorded; a successful navigation writes a file named
//! after the URL's last path segment into the download directory, the way
//! the browser's download manager would.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{BrowserPage, BrowserTab, PageElement};
use crate::error::BrowserError;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub id: i64,
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub parent_attributes: HashMap<String, String>,
    pub hidden: bool,
    pub stale: bool,
}

impl FakeElement {
    pub fn new(id: i64, tag: &str) -> Self {
        Self {
            id,
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn anchor(id: i64, href: &str) -> Self {
        Self::new(id, "a").with_attr("href", href)
    }

    pub fn image(id: i64, src: &str) -> Self {
        Self::new(id, "img").with_attr("src", src)
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_parent_attr(mut self, name: &str, value: &str) -> Self {
        self.parent_attributes
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Detached after discovery: visible during the scan, then every read fails.
    pub fn stale(mut self) -> Self {
        self.stale = true;
        self
    }

    fn check_attached(&self) -> Result<(), BrowserError> {
        if self.stale {
            Err(BrowserError::StaleElement)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PageElement for FakeElement {
    fn node_id(&self) -> i64 {
        self.id
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError> {
        self.check_attached()?;
        Ok(self.attributes.get(name).cloned())
    }

    async fn parent_attribute(&self, name: &str) -> Result<Option<String>, BrowserError> {
        self.check_attached()?;
        Ok(self.parent_attributes.get(name).cloned())
    }

    async fn tag_name(&self) -> Result<String, BrowserError> {
        self.check_attached()?;
        Ok(self.tag.clone())
    }

    async fn is_displayed(&self) -> Result<bool, BrowserError> {
        Ok(!self.hidden)
    }
}

#[derive(Debug, Default)]
pub struct FakePage {
    selectors: HashMap<String, Result<Vec<FakeElement>, String>>,
    url: Option<String>,
    download_dir: Option<PathBuf>,
    failing_urls: HashSet<String>,
    navigations: Arc<Mutex<Vec<String>>>,
    open_tabs: Arc<Mutex<usize>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selector(mut self, selector: &str, elements: Vec<FakeElement>) -> Self {
        self.selectors.insert(selector.to_string(), Ok(elements));
        self
    }

    pub fn with_failing_selector(mut self, selector: &str) -> Self {
        self.selectors
            .insert(selector.to_string(), Err("invalid selector".to_string()));
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn downloading_into(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    pub fn failing_navigation(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn open_tabs(&self) -> usize {
        *self.open_tabs.lock().unwrap()
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    type Element = FakeElement;
    type Tab = FakeTab;

    async fn query_all(&self, selector: &str) -> Result<Vec<FakeElement>, BrowserError> {
        match self.selectors.get(selector) {
            Some(Ok(elements)) => Ok(elements.clone()),
            Some(Err(e)) => Err(BrowserError::Selector(format!("{}: {}", selector, e))),
            None => Ok(Vec::new()),
        }
    }

    async fn current_url(&self) -> Result<Option<String>, BrowserError> {
        Ok(self.url.clone())
    }

    async fn open_tab(&self) -> Result<FakeTab, BrowserError> {
        *self.open_tabs.lock().unwrap() += 1;
        Ok(FakeTab {
            download_dir: self.download_dir.clone(),
            failing_urls: self.failing_urls.clone(),
            navigations: Arc::clone(&self.navigations),
            open_tabs: Arc::clone(&self.open_tabs),
        })
    }

    async fn focus(&self) -> Result<(), BrowserError> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeTab {
    download_dir: Option<PathBuf>,
    failing_urls: HashSet<String>,
    navigations: Arc<Mutex<Vec<String>>>,
    open_tabs: Arc<Mutex<usize>>,
}

#[async_trait]
impl BrowserTab for FakeTab {
    async fn focus(&self) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.navigations.lock().unwrap().push(url.to_string());

        if self.failing_urls.contains(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }

        if let Some(dir) = &self.download_dir {
            let name = url.rsplit('/').next().unwrap_or("download.pdf");
            std::fs::write(dir.join(name), b"%PDF-1.4\n").unwrap();
        }

        Ok(())
    }

    async fn close(self) -> Result<(), BrowserError> {
        *self.open_tabs.lock().unwrap() -= 1;
        Ok(())
    }
}
