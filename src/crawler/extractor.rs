//! HTML reference extraction
//!
//! This module parses fetched pages and pulls out the raw references the
//! crawler may follow:
//! - Links to follow (from `<a href>`)
//! - Assets to mirror (`<img src>`, `<script src>`, `<link href>` for
//!   stylesheets, icons, manifests and preloads, and `url(...)` inside inline
//!   `style` attributes)
//!
//! References are returned exactly as written in the document; resolution
//! and domain filtering happen in [`crate::url::normalize`].

use scraper::{Html, Selector};
use std::collections::BTreeSet;
use thiserror::Error;

/// Number of leading bytes inspected when sniffing for binary content
const SNIFF_LEN: usize = 1024;

/// `<link rel>` tokens whose target is a resource rather than another page
const ASSET_RELS: &[&str] = &[
    "stylesheet",
    "icon",
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
    "mask-icon",
    "preload",
    "manifest",
];

/// Errors that can occur while extracting references
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector {selector}: {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },

    #[error("Body is not text ({0} bytes)")]
    Binary(usize),
}

/// Raw references found on a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Navigable link references
    pub links: BTreeSet<String>,

    /// Asset references
    pub assets: BTreeSet<String>,
}

impl Extracted {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.assets.is_empty()
    }
}

/// Extracts links and asset references from HTML documents
#[derive(Debug, Clone)]
pub struct Extractor {
    /// Lowercased file extensions (".pdf") whose links are not followed
    link_exclusions: Vec<String>,
}

impl Extractor {
    pub fn new(link_exclusions: &[String]) -> Self {
        Self {
            link_exclusions: link_exclusions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Extracts link and asset references from an HTML document
    ///
    /// # Link Extraction Rules
    ///
    /// **Links** come from `<a href>` only, excluding:
    /// - `<a href="..." download>`
    /// - `javascript:`, `mailto:`, `tel:` and `data:` references
    /// - Fragment-only references (same page anchors)
    /// - Paths ending in an excluded extension
    ///
    /// **Assets** come from `<img src>`, `<script src>`, `<link href>` with an
    /// asset `rel` (stylesheet, icon, manifest, preload) and `url(...)` in
    /// inline styles, with the same scheme filtering but no extension
    /// exclusions.
    ///
    /// # Arguments
    ///
    /// * `html` - The raw document bytes; decoded lossily as UTF-8
    ///
    /// # Returns
    ///
    /// * `Ok(Extracted)` - The de-duplicated references
    /// * `Err(ExtractError)` - The body could not be treated as HTML
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_mirror::crawler::Extractor;
    ///
    /// let extractor = Extractor::new(&[".pdf".to_string()]);
    /// let html = br#"<a href="/about">About</a><a href="/menu.pdf">Menu</a><img src="/logo.png">"#;
    /// let extracted = extractor.extract(html).unwrap();
    ///
    /// assert!(extracted.links.contains("/about"));
    /// assert!(!extracted.links.contains("/menu.pdf"));
    /// assert!(extracted.assets.contains("/logo.png"));
    /// ```
    pub fn extract(&self, html: &[u8]) -> Result<Extracted, ExtractError> {
        let head = &html[..html.len().min(SNIFF_LEN)];
        if head.contains(&0) {
            return Err(ExtractError::Binary(html.len()));
        }

        let text = String::from_utf8_lossy(html);
        let document = Html::parse_document(&text);

        let mut extracted = Extracted::default();

        for element in document.select(&selector("a[href]")?) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                if is_followable(href) && !self.is_excluded(href) {
                    extracted.links.insert(href.trim().to_string());
                }
            }
        }

        for (query, attr) in [("img[src]", "src"), ("script[src]", "src")] {
            for element in document.select(&selector(query)?) {
                if let Some(value) = element.value().attr(attr) {
                    if is_followable(value) {
                        extracted.assets.insert(value.trim().to_string());
                    }
                }
            }
        }

        for element in document.select(&selector("link[href][rel]")?) {
            let rel = element.value().attr("rel").unwrap_or_default();
            if !is_asset_rel(rel) {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                if is_followable(href) {
                    extracted.assets.insert(href.trim().to_string());
                }
            }
        }

        for element in document.select(&selector("[style]")?) {
            if let Some(style) = element.value().attr("style") {
                for reference in style_urls(style) {
                    if is_followable(&reference) {
                        extracted.assets.insert(reference);
                    }
                }
            }
        }

        Ok(extracted)
    }

    /// Returns true if the link's path ends in an excluded extension
    ///
    /// Query and fragment are ignored and matching is case-insensitive.
    pub fn is_excluded(&self, href: &str) -> bool {
        let path = href
            .trim()
            .split(&['?', '#'][..])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        self.link_exclusions.iter().any(|ext| path.ends_with(ext))
    }
}

fn selector(query: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(query).map_err(|e| ExtractError::Selector {
        selector: query,
        message: format!("{:?}", e),
    })
}

/// Filters out references that can never be fetched
fn is_followable(reference: &str) -> bool {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return false;
    }

    let lower = reference.to_ascii_lowercase();
    !(lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:"))
}

/// Returns true if any token of a `rel` attribute names an asset
///
/// Navigational relations (`next`, `canonical`, `alternate`) point at pages
/// and must reach the scheduler as pages through `<a href>` instead.
fn is_asset_rel(rel: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|token| ASSET_RELS.iter().any(|asset| token.eq_ignore_ascii_case(asset)))
}

/// Pulls every `url(...)` reference out of an inline style declaration
fn style_urls(style: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut rest = style;

    while let Some(start) = rest.find("url(") {
        rest = &rest[start + 4..];
        let Some(end) = rest.find(')') else {
            break;
        };

        let reference = rest[..end].trim().trim_matches(|c| c == '"' || c == '\'');
        if !reference.is_empty() {
            urls.push(reference.trim().to_string());
        }
        rest = &rest[end + 1..];
    }

    urls
}
