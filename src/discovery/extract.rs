//! URL extraction from discovered elements.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::browser::PageElement;
use crate::error::BrowserError;

/// `window.open('<path ending in pdf>')` inside an inline handler.
static WINDOW_OPEN_PDF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"window\.open\(['"](.+?pdf)['"]"#).unwrap());

/// Where a candidate URL was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The element's own `href`.
    Anchor,
    /// A `window.open(...)` call in the element's `onclick`.
    ScriptHandler,
    /// The `href` of the container wrapping an image.
    Image,
}

/// A URL extracted from a discovered element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub url: String,
    pub source_kind: SourceKind,
}

/// Loose acceptance filter: anything mentioning "pdf" passes.
pub fn is_probable_pdf_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    let lower = url.to_lowercase();
    lower.ends_with(".pdf") || lower.contains("pdf")
}

/// Path argument of a `window.open` call ending in "pdf".
pub fn pdf_path_from_onclick(onclick: &str) -> Option<&str> {
    if !onclick.to_lowercase().contains("pdf") {
        return None;
    }
    WINDOW_OPEN_PDF
        .captures(onclick)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Resolve a possibly relative path against the page URL.
pub fn resolve_against(base: Option<&str>, path: &str) -> String {
    base.and_then(|b| Url::parse(b).ok())
        .and_then(|b| b.join(path).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| path.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Derive a PDF URL from an element.
///
/// Tries the element's `href`, then a `window.open` call in its `onclick`,
/// then (for images) the parent's `href`. Attribute reads that fail count as
/// absent. A stale element while reading the tag name is returned as an error.
/// Candidates failing [`is_probable_pdf_url`] are rejected.
pub async fn extract_url<E: PageElement>(
    element: &E,
    page_url: Option<&str>,
) -> Result<Option<CandidateUrl>, BrowserError> {
    let candidate = find_candidate(element, page_url).await?;

    Ok(candidate.filter(|c| {
        let accepted = is_probable_pdf_url(&c.url);
        if !accepted {
            debug!("URL doesn't seem to be a PDF: {}", c.url);
        }
        accepted
    }))
}

async fn find_candidate<E: PageElement>(
    element: &E,
    page_url: Option<&str>,
) -> Result<Option<CandidateUrl>, BrowserError> {
    match element.attribute("href").await {
        Ok(href) => {
            if let Some(url) = non_empty(href) {
                return Ok(Some(CandidateUrl {
                    url,
                    source_kind: SourceKind::Anchor,
                }));
            }
        }
        Err(e) => debug!("Could not read href: {}", e),
    }

    match element.attribute("onclick").await {
        Ok(Some(onclick)) => {
            if let Some(path) = pdf_path_from_onclick(&onclick) {
                return Ok(Some(CandidateUrl {
                    url: resolve_against(page_url, path),
                    source_kind: SourceKind::ScriptHandler,
                }));
            }
        }
        Ok(None) => {}
        Err(e) => debug!("Could not read onclick: {}", e),
    }

    if element.tag_name().await? == "img" {
        match element.parent_attribute("href").await {
            Ok(href) => {
                return Ok(non_empty(href).map(|url| CandidateUrl {
                    url,
                    source_kind: SourceKind::Image,
                }));
            }
            Err(e) => debug!("Could not read parent href: {}", e),
        }
    }

    Ok(None)
}
