//! Headless browser fetch strategy
//!
//! Pages are rendered in a real Chromium instance so scripts run and the
//! saved HTML is the post-render DOM. Assets go through the plain HTTP
//! fetcher; rendering a stylesheet buys nothing.

use crate::config::FetcherConfig;
use crate::crawler::fetcher::{
    classify_status, FetchError, FetchResult, FetchStatus, HttpFetcher, PageFetcher,
};
use crate::state::TargetKind;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{EventResponseReceived, ResourceType};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

/// Upper bound on waiting for the document response after navigation
const RESPONSE_WAIT: Duration = Duration::from_secs(5);

/// Browser-backed fetcher
pub struct BrowserFetcher {
    browser: Mutex<Option<Arc<Browser>>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    http: HttpFetcher,
    timeout: Duration,
}

impl BrowserFetcher {
    /// Launches Chromium with the configured identity
    ///
    /// # Returns
    ///
    /// * `Ok(BrowserFetcher)` - Browser running and ready for pages
    /// * `Err(FetchError)` - No usable browser, or the launch failed
    pub async fn launch(config: &FetcherConfig) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let mut builder = BrowserConfig::builder()
            .request_timeout(timeout)
            .window_size(1920, 1080)
            .arg(format!("--user-agent={}", config.user_agent))
            .arg(format!("--lang={}", primary_language(&config.accept_language)))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--mute-audio");

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| FetchError::Browser(format!("Browser config error: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| FetchError::Browser(format!("Browser launch failed: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
            tracing::debug!("Browser handler task completed");
        });

        tracing::info!(headless = config.headless, "Browser launched");

        Ok(Self {
            browser: Mutex::new(Some(Arc::new(browser))),
            handler: Mutex::new(Some(handler_task)),
            http: HttpFetcher::new(config)?,
            timeout,
        })
    }

    async fn render(&self, url: &Url) -> FetchResult {
        let browser = match self.browser.lock().await.as_ref() {
            Some(browser) => Arc::clone(browser),
            None => return FetchResult::terminal(url, None, "Browser already shut down"),
        };

        let page = match tokio::time::timeout(self.timeout, browser.new_page("about:blank")).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => return FetchResult::transient(url, None, format!("Failed to open page: {}", e)),
            Err(_) => return FetchResult::transient(url, None, "Page open timeout"),
        };

        // Subscribe before navigating so the document response is not missed
        let mut responses = match page.event_listener::<EventResponseReceived>().await {
            Ok(responses) => responses,
            Err(e) => {
                close_page(page, url).await;
                return FetchResult::transient(url, None, format!("Failed to listen for responses: {}", e));
            }
        };

        let navigation = tokio::time::timeout(self.timeout, page.goto(url.as_str()))
            .await
            .map(|result| result.map(|_| ()));
        match navigation {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                close_page(page, url).await;
                return FetchResult::transient(url, None, format!("Navigation failed: {}", e));
            }
            Err(_) => {
                close_page(page, url).await;
                return FetchResult::transient(url, None, "Navigation timeout");
            }
        }

        let status_code = document_status(&mut responses).await;
        match classify_document_status(status_code) {
            FetchStatus::Success => {}
            FetchStatus::TransientFailure => {
                close_page(page, url).await;
                return FetchResult::transient(url, status_code, http_error(status_code));
            }
            FetchStatus::TerminalFailure => {
                close_page(page, url).await;
                return FetchResult::terminal(url, status_code, http_error(status_code));
            }
        }

        let html = match tokio::time::timeout(self.timeout, page.content()).await {
            Ok(Ok(html)) => html,
            Ok(Err(e)) => {
                close_page(page, url).await;
                return FetchResult::transient(url, status_code, format!("Failed to read content: {}", e));
            }
            Err(_) => {
                close_page(page, url).await;
                return FetchResult::transient(url, status_code, "Content read timeout");
            }
        };

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| url.clone());

        close_page(page, url).await;

        FetchResult::success(
            url,
            final_url,
            status_code,
            html.into_bytes(),
            Some("text/html".to_string()),
        )
    }
}

/// Waits for the main document's response and returns its status code
///
/// Redirect hops never surface as `responseReceived`, so the first document
/// response is the one that was rendered.
async fn document_status(responses: &mut EventStream<EventResponseReceived>) -> Option<u16> {
    let first_document = async {
        while let Some(event) = responses.next().await {
            if event.r#type == ResourceType::Document {
                return u16::try_from(event.response.status).ok();
            }
        }
        None
    };

    tokio::time::timeout(RESPONSE_WAIT, first_document)
        .await
        .ok()
        .flatten()
}

/// Classifies a rendered document by its HTTP status
///
/// A page served without an observable response (cache, service worker)
/// rendered fine and counts as a success.
fn classify_document_status(status_code: Option<u16>) -> FetchStatus {
    match status_code.and_then(|code| StatusCode::from_u16(code).ok()) {
        Some(status) => classify_status(status),
        None => FetchStatus::Success,
    }
}

fn http_error(status_code: Option<u16>) -> String {
    match status_code.and_then(|code| StatusCode::from_u16(code).ok()) {
        Some(status) => format!("HTTP {}", status),
        None => "HTTP error".to_string(),
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn fetch_once(&self, url: &Url, kind: TargetKind) -> FetchResult {
        match kind {
            TargetKind::Page => self.render(url).await,
            TargetKind::Asset => self.http.fetch_once(url, kind).await,
        }
    }

    async fn shutdown(&self) {
        if let Some(browser) = self.browser.lock().await.take() {
            match Arc::try_unwrap(browser) {
                Ok(mut browser) => {
                    if let Err(e) = browser.close().await {
                        tracing::warn!("Browser close error: {}", e);
                    }
                    let _ = browser.wait().await;
                }
                Err(_) => tracing::warn!("Browser still in use at shutdown"),
            }
        }

        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }
    }
}

async fn close_page(page: chromiumoxide::Page, url: &Url) {
    if let Err(e) = page.close().await {
        tracing::debug!(url = %url, "Page close error: {}", e);
    }
}

/// First language tag of an Accept-Language value ("en-US,en;q=0.9" -> "en-US")
fn primary_language(accept_language: &str) -> &str {
    accept_language
        .split(',')
        .next()
        .and_then(|tag| tag.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .unwrap_or("en-US")
}
