//! chromiumoxide-backed implementations of the browser traits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{BringToFrontParams, NavigateParams};
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, Page};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{BrowserPage, BrowserTab, PageElement};
use crate::error::BrowserError;

/// Error text Chrome reports when a navigation was handed to the download manager.
const DOWNLOAD_ABORT: &str = "net::ERR_ABORTED";

/// JavaScript to wait for page ready state.
const WAIT_FOR_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

const TAG_NAME_FN: &str = "function() { return this.tagName.toLowerCase(); }";

const IS_DISPLAYED_FN: &str = r#"
    function() {
        if (!this.isConnected) return false;
        const style = window.getComputedStyle(this);
        if (style.display === 'none'
            || style.visibility === 'hidden'
            || style.visibility === 'collapse'
            || parseFloat(style.opacity) === 0) {
            return false;
        }
        const rect = this.getBoundingClientRect();
        return rect.width > 0 && rect.height > 0;
    }
"#;

fn cdp_error(err: chromiumoxide::error::CdpError) -> BrowserError {
    BrowserError::from_cdp_message(err.to_string())
}

/// Build a function reading `name` from `target` (an expression over `this`).
fn attribute_fn(target: &str, name: &str) -> String {
    let name = serde_json::Value::from(name);
    format!(
        "function() {{ \
            const el = {target}; \
            if (!el) return null; \
            const prop = el[{name}]; \
            if (typeof prop === 'string' && prop.length > 0) return prop; \
            return el.getAttribute ? el.getAttribute({name}) : null; \
        }}"
    )
}

/// An element handle on a Chrome page.
pub struct ChromeElement {
    inner: Element,
}

impl ChromeElement {
    async fn call(&self, function: &str) -> Result<Option<serde_json::Value>, BrowserError> {
        let returns = self
            .inner
            .call_js_fn(function.to_string(), false)
            .await
            .map_err(cdp_error)?;

        if let Some(details) = returns.exception_details {
            return Err(BrowserError::from_cdp_message(details.text));
        }

        Ok(returns.result.value)
    }

    async fn call_string(&self, function: &str) -> Result<Option<String>, BrowserError> {
        Ok(self
            .call(function)
            .await?
            .and_then(|v| v.as_str().map(str::to_string)))
    }
}

#[async_trait]
impl PageElement for ChromeElement {
    fn node_id(&self) -> i64 {
        *self.inner.backend_node_id.inner()
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError> {
        self.call_string(&attribute_fn("this", name)).await
    }

    async fn parent_attribute(&self, name: &str) -> Result<Option<String>, BrowserError> {
        self.call_string(&attribute_fn("this.parentElement", name))
            .await
    }

    async fn tag_name(&self) -> Result<String, BrowserError> {
        self.call_string(TAG_NAME_FN)
            .await?
            .ok_or_else(|| BrowserError::Script("element has no tag name".into()))
    }

    async fn is_displayed(&self) -> Result<bool, BrowserError> {
        Ok(self
            .call(IS_DISPLAYED_FN)
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

/// A tab opened for one download.
pub struct ChromeTab {
    page: Page,
}

#[async_trait]
impl BrowserTab for ChromeTab {
    async fn focus(&self) -> Result<(), BrowserError> {
        self.page
            .execute(BringToFrontParams::default())
            .await
            .map_err(cdp_error)?;
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|reason| BrowserError::Navigation {
                url: url.to_string(),
                reason,
            })?;

        let response = self.page.execute(params).await.map_err(cdp_error)?;

        match response.result.error_text.as_deref() {
            None | Some("") => Ok(()),
            Some(DOWNLOAD_ABORT) => {
                debug!("Navigation to {} became a download", url);
                Ok(())
            }
            Some(reason) => Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: reason.to_string(),
            }),
        }
    }

    async fn close(self) -> Result<(), BrowserError> {
        self.page.close().await.map_err(cdp_error)
    }
}

/// The primary tab of a browser session.
pub struct ChromePage {
    browser: Arc<Mutex<Browser>>,
    page: Page,
}

impl ChromePage {
    pub(crate) fn new(browser: Arc<Mutex<Browser>>, page: Page) -> Self {
        Self { browser, page }
    }

    /// Navigate this tab and wait for the document to become ready.
    ///
    /// Load failures and timeouts are logged; the caller carries on with
    /// whatever the page managed to render.
    pub async fn load(&self, url: &str, timeout: Duration) {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                warn!("Error navigating to {}: {}", url, e);
                return;
            }
            Err(_) => {
                warn!("Page load timed out, but continuing anyway");
                return;
            }
        }

        match tokio::time::timeout(timeout, self.page.evaluate(WAIT_FOR_READY_SCRIPT)).await {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => {
                debug!("Could not check ready state: {}", e);
            }
            Err(_) => {
                warn!("Timeout waiting for page ready state");
            }
        }
    }
}

#[async_trait]
impl BrowserPage for ChromePage {
    type Element = ChromeElement;
    type Tab = ChromeTab;

    async fn query_all(&self, selector: &str) -> Result<Vec<ChromeElement>, BrowserError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::Selector(format!("{}: {}", selector, e)))?;

        Ok(elements
            .into_iter()
            .map(|inner| ChromeElement { inner })
            .collect())
    }

    async fn current_url(&self) -> Result<Option<String>, BrowserError> {
        let url = self.page.url().await.map_err(cdp_error)?;
        Ok(url.map(|u| u.to_string()))
    }

    async fn open_tab(&self) -> Result<ChromeTab, BrowserError> {
        let browser = self.browser.lock().await;
        let page = browser.new_page("about:blank").await.map_err(cdp_error)?;
        Ok(ChromeTab { page })
    }

    async fn focus(&self) -> Result<(), BrowserError> {
        self.page
            .execute(BringToFrontParams::default())
            .await
            .map_err(cdp_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_fn_quotes_name() {
        let script = attribute_fn("this", "href");
        assert!(script.contains(r#"el["href"]"#));
        assert!(script.contains(r#"getAttribute("href")"#));
    }

    #[test]
    fn test_attribute_fn_targets_parent() {
        let script = attribute_fn("this.parentElement", "href");
        assert!(script.contains("const el = this.parentElement;"));
    }
}
