use crate::url::domain::RootHost;
use crate::{UrlError, UrlResult};
use thiserror::Error;
use url::Url;

/// Why a discovered link was not accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("empty link")]
    Empty,

    #[error("unparseable link: {0}")]
    Unparseable(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("cross-domain host: {0}")]
    CrossDomain(String),
}

/// Normalizes a discovered link against the page it was found on
///
/// # Normalization Steps
///
/// 1. Reject empty or whitespace-only links
/// 2. Resolve the link against `base_url` (dot segments are removed and the
///    host is lowercased by the URL parser)
/// 3. Reject anything that is not HTTP or HTTPS
/// 4. Remove the fragment
/// 5. Reject hosts other than the crawl's root host
/// 6. Rewrite the scheme to the root's scheme
///
/// Paths are otherwise left alone: `/about` and `/about/` stay distinct, as
/// do query strings.
///
/// # Examples
///
/// ```
/// use sumi_mirror::url::{normalize, RootHost};
/// use url::Url;
///
/// let base = Url::parse("https://example.com/team/").unwrap();
/// let root = RootHost::from_url(&base).unwrap();
///
/// let url = normalize("../about#history", &base, &root).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
///
/// assert!(normalize("https://other.com/x", &base, &root).is_err());
/// ```
pub fn normalize(raw_link: &str, base_url: &Url, root: &RootHost) -> Result<Url, Rejection> {
    let raw_link = raw_link.trim();
    if raw_link.is_empty() {
        return Err(Rejection::Empty);
    }

    let mut url = base_url
        .join(raw_link)
        .map_err(|e| Rejection::Unparseable(format!("{}: {}", raw_link, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Rejection::UnsupportedScheme(url.scheme().to_string()));
    }

    url.set_fragment(None);

    if !root.matches(&url) {
        return Err(Rejection::CrossDomain(
            url.host_str().unwrap_or_default().to_string(),
        ));
    }

    // http and https twins of one page share a visited entry and a local path
    if url.scheme() != root.scheme() && url.set_scheme(root.scheme()).is_err() {
        return Err(Rejection::UnsupportedScheme(url.scheme().to_string()));
    }

    Ok(url)
}

/// Parses and validates the root URL a crawl starts from
///
/// The root must be an absolute HTTP(S) URL with a host. Its fragment is
/// dropped so the root enters the visited set in normalized form.
pub fn parse_root_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}
