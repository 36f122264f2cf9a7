use serde::Deserialize;

/// Browser-like user agent sent by default; the mirrored site rejects
/// default HTTP client fingerprints.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Extensions that are never followed as navigable pages
pub const DEFAULT_LINK_EXCLUSIONS: &[&str] = &[".pdf", ".zip", ".jpg", ".png", ".gif", ".css", ".js"];

/// Main configuration structure for Sumi-Mirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Root URL of the site to mirror; its host bounds the crawl
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Maximum link depth from the root page
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of pages fetched in one run
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Number of concurrent fetch workers
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Minimum time between consecutive requests of one worker (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_delay_ms")]
    pub politeness_delay_ms: u64,
}

/// Which fetch strategy retrieves pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Plain HTTP requests
    #[default]
    Http,
    /// Pages rendered in a headless browser, assets over HTTP
    Browser,
}

impl FetchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Browser => "browser",
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    #[serde(default)]
    pub strategy: FetchStrategy,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum attempts per URL, including the first one
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit; attempt `n` is followed by a wait of `n * backoff-step-ms`
    #[serde(rename = "backoff-step-ms", default = "default_backoff_step_ms")]
    pub backoff_step_ms: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language", default = "default_accept_language")]
    pub accept_language: String,

    /// Run the browser strategy without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,
}

/// Link and asset extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    /// File extensions never followed as pages (still fetched as assets)
    #[serde(rename = "link-exclusions", default = "default_link_exclusions")]
    pub link_exclusions: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the mirror is written into
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Optional path of a markdown run report
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::default(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_step_ms: default_backoff_step_ms(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            headless: default_headless(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            link_exclusions: default_link_exclusions(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            summary_path: None,
        }
    }
}

impl Config {
    /// Builds a configuration with defaults for everything but the root URL
    pub fn for_root(root_url: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig {
                root_url: root_url.into(),
                max_depth: default_max_depth(),
                max_pages: default_max_pages(),
                workers: default_workers(),
                politeness_delay_ms: default_politeness_delay_ms(),
            },
            fetcher: FetcherConfig::default(),
            extractor: ExtractorConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

fn default_max_depth() -> u32 {
    3
}

fn default_max_pages() -> u32 {
    50
}

fn default_workers() -> u32 {
    1
}

fn default_politeness_delay_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_step_ms() -> u64 {
    2000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_link_exclusions() -> Vec<String> {
    DEFAULT_LINK_EXCLUSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_output_directory() -> String {
    "./public".to_string()
}
