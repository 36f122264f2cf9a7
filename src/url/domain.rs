use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_mirror::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// The host a crawl is confined to
///
/// Two URLs are on the same site when the host and any explicit port match.
/// The scheme is not part of the comparison: `http://example.com/a` belongs to
/// an `https://example.com` crawl, while `http://127.0.0.1:8080` and
/// `http://127.0.0.1:9090` are distinct sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RootHost {
    host: String,
    port: Option<u16>,
    scheme: String,
}

impl RootHost {
    /// Builds the root host from the crawl's root URL
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = extract_domain(url)?;
        if host.is_empty() {
            return None;
        }

        Some(Self {
            host,
            port: url.port(),
            scheme: url.scheme().to_string(),
        })
    }

    /// Returns the lowercase host name
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the root URL's scheme; same-site links are rewritten to it
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns true if `url` points at this host, whatever its scheme
    pub fn matches(&self, url: &Url) -> bool {
        match extract_domain(url) {
            Some(host) => host == self.host && url.port() == self.port,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_subdomain() {
        let url = Url::parse("https://blog.example.com/post").unwrap();
        assert_eq!(extract_domain(&url), Some("blog.example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_mixed_case() {
        let url = Url::parse("https://Example.COM/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_root_host_matches_same_host() {
        let root = RootHost::from_url(&Url::parse("https://example.com/").unwrap()).unwrap();

        assert!(root.matches(&Url::parse("https://example.com/about").unwrap()));
        assert!(root.matches(&Url::parse("https://EXAMPLE.com/a/b?c=d").unwrap()));
        assert!(root.matches(&Url::parse("https://example.com:443/").unwrap()));
    }

    #[test]
    fn test_root_host_rejects_other_hosts() {
        let root = RootHost::from_url(&Url::parse("https://example.com/").unwrap()).unwrap();

        assert!(!root.matches(&Url::parse("https://other.com/page").unwrap()));
        assert!(!root.matches(&Url::parse("https://www.example.com/").unwrap()));
        assert!(!root.matches(&Url::parse("https://sub.example.com/").unwrap()));
    }

    #[test]
    fn test_root_host_distinguishes_ports() {
        let root = RootHost::from_url(&Url::parse("http://127.0.0.1:8080/").unwrap()).unwrap();

        assert!(root.matches(&Url::parse("http://127.0.0.1:8080/page").unwrap()));
        assert!(!root.matches(&Url::parse("http://127.0.0.1:9090/page").unwrap()));
    }

    #[test]
    fn test_root_host_ignores_scheme() {
        let root = RootHost::from_url(&Url::parse("https://example.com/").unwrap()).unwrap();

        assert_eq!(root.scheme(), "https");
        assert!(root.matches(&Url::parse("http://example.com/about").unwrap()));
        assert!(!root.matches(&Url::parse("http://example.com:8080/about").unwrap()));
    }

    #[test]
    fn test_root_host_requires_host() {
        let url = Url::parse("data:text/plain,hello").unwrap();
        assert!(RootHost::from_url(&url).is_none());
    }
}
