//! Browser control for PDF harvesting.
//!
//! Discovery and the download loop talk to the browser through the
//! [`BrowserPage`], [`BrowserTab`] and [`PageElement`] traits. The real
//! implementation drives Chrome over the DevTools protocol via chromiumoxide.

#[cfg(feature = "browser")]
mod locate;
#[cfg(feature = "browser")]
mod page;
#[cfg(feature = "browser")]
mod profile;
#[cfg(feature = "browser")]
mod session;

#[cfg(test)]
pub(crate) mod fake;

#[cfg(feature = "browser")]
pub use page::{ChromeElement, ChromePage, ChromeTab};
#[cfg(feature = "browser")]
pub use session::BrowserSession;

use async_trait::async_trait;

use crate::error::BrowserError;

/// A DOM element found on the page.
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Identity of the underlying DOM node. Two handles to the same node
    /// report the same id.
    fn node_id(&self) -> i64;

    /// Attribute value, preferring the resolved DOM property (so `href`
    /// comes back absolute).
    async fn attribute(&self, name: &str) -> Result<Option<String>, BrowserError>;

    /// Same as [`PageElement::attribute`] on the immediate parent element.
    async fn parent_attribute(&self, name: &str) -> Result<Option<String>, BrowserError>;

    /// Lower-case tag name.
    async fn tag_name(&self) -> Result<String, BrowserError>;

    /// Whether the element is currently rendered.
    async fn is_displayed(&self) -> Result<bool, BrowserError>;
}

/// A secondary browsing context opened for a single download.
#[async_trait]
pub trait BrowserTab: Send {
    /// Make this tab the active one.
    async fn focus(&self) -> Result<(), BrowserError>;

    /// Navigate to a URL. A navigation the browser turns into a download
    /// counts as success.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    async fn close(self) -> Result<(), BrowserError>;
}

/// The primary browsing context holding the page being scanned.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    type Element: PageElement;
    type Tab: BrowserTab;

    /// All elements matching a CSS selector, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>, BrowserError>;

    /// URL of the loaded page, used to resolve relative links.
    async fn current_url(&self) -> Result<Option<String>, BrowserError>;

    /// Open a new blank tab.
    async fn open_tab(&self) -> Result<Self::Tab, BrowserError>;

    /// Switch back to this context.
    async fn focus(&self) -> Result<(), BrowserError>;
}
