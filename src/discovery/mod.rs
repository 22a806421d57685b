//! PDF link discovery on the loaded page.
//!
//! The target markup is untrusted and inconsistent, so several selectors
//! are tried. A selector that fails contributes nothing; the rest still run.

pub mod extract;

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::browser::{BrowserPage, PageElement};

/// Structural selectors, applied in this order.
pub const PDF_LINK_SELECTORS: &[&str] = &[
    "a[href$='.pdf']",
    "a.pdf-icon",
    "a img[src*='pdf']",
    "a[href*='pdf']",
    "img[src*='pdf']",
    "a[onclick*='pdf']",
];

/// Broad case-insensitive match, applied after the structural selectors.
pub const BROAD_PDF_SELECTOR: &str = "a[href*='pdf' i], a[onclick*='pdf' i]";

/// A page element suspected of referencing a PDF.
#[derive(Debug)]
pub struct DiscoveredLink<E> {
    pub element: E,
    /// First selector that matched the element.
    pub selector: &'static str,
}

/// Find visible elements that look like PDF links.
///
/// Results are de-duplicated by DOM node (not by URL) and keep the order in
/// which selectors first matched them.
pub async fn find_pdf_links<P: BrowserPage>(page: &P) -> Vec<DiscoveredLink<P::Element>> {
    info!("Searching for PDF links...");

    let mut seen = HashSet::new();
    let mut matches = Vec::new();

    let selectors = PDF_LINK_SELECTORS
        .iter()
        .copied()
        .chain(std::iter::once(BROAD_PDF_SELECTOR));

    for selector in selectors {
        let found = match page.query_all(selector).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Error finding links with selector {}: {}", selector, e);
                continue;
            }
        };

        if !found.is_empty() {
            info!("Found {} links with selector: {}", found.len(), selector);
        }

        for element in found {
            if seen.insert(element.node_id()) {
                matches.push(DiscoveredLink { element, selector });
            }
        }
    }

    let mut links = Vec::with_capacity(matches.len());
    for link in matches {
        match link.element.is_displayed().await {
            Ok(true) => links.push(link),
            Ok(false) => debug!("Dropping hidden match for {}", link.selector),
            Err(e) => debug!("Dropping match for {}: {}", link.selector, e),
        }
    }

    info!("Total unique PDF links found: {}", links.len());
    links
}
