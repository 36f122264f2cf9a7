//! URL to local path mapping
//!
//! Maps a normalized URL onto the relative file path it is mirrored at:
//!
//! | URL path          | Local path              |
//! |-------------------|-------------------------|
//! | `/` or empty      | `index.html`            |
//! | `/about`          | `about.html`            |
//! | `/services/`      | `services/index.html`   |
//! | `/css/site.css`   | `css/site.css`          |
//! | `/search?q=roof`  | `search__<hash>.html`   |
//!
//! The path stays percent-encoded, so no segment can decode into a separator.

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use url::Url;

/// File name used for the root and for directory-style URLs
const INDEX_FILE: &str = "index.html";

/// Number of hex digits of the query hash kept in file names
const QUERY_HASH_LEN: usize = 8;

/// Converts a normalized URL into the relative path it is stored at
///
/// The mapping is a pure function of the URL's path and query: the host,
/// scheme and fragment do not take part.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use sumi_mirror::storage::to_local_path;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/services/").unwrap();
/// assert_eq!(to_local_path(&url), PathBuf::from("services/index.html"));
///
/// let url = Url::parse("https://example.com/services").unwrap();
/// assert_eq!(to_local_path(&url), PathBuf::from("services.html"));
/// ```
pub fn to_local_path(url: &Url) -> PathBuf {
    let path = url.path().trim_start_matches('/');

    let mut segments: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();

    let directory_style = path.is_empty() || path.ends_with('/');
    let file_name = if directory_style {
        INDEX_FILE.to_string()
    } else {
        // Non-empty path without a trailing slash always has a last segment
        let last = segments.pop().unwrap_or_default();
        if last.contains('.') {
            last
        } else {
            format!("{}.html", last)
        }
    };

    let file_name = match url.query() {
        Some(query) => with_query_suffix(&file_name, query),
        None => file_name,
    };

    let mut local = PathBuf::new();
    for segment in segments {
        local.push(segment);
    }
    local.push(file_name);
    local
}

/// Inserts a short query hash in front of the file extension
fn with_query_suffix(file_name: &str, query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    let digest = hex::encode(hasher.finalize());
    let suffix = &digest[..QUERY_HASH_LEN];

    match file_name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}__{}{}", &file_name[..dot], suffix, &file_name[dot..]),
        _ => format!("{}__{}", file_name, suffix),
    }
}
