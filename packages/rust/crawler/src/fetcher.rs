//! Dual-transport page fetcher.
//!
//! Every URL is tried with the plain HTTP client first; whatever fails (or
//! comes back as something other than an HTML 200) is retried through the
//! shared headless-browser page. Most documentation is static HTML, so the
//! cheap path carries almost all of the traffic and the browser only pays
//! for the client-rendered minority.
//!
//! Failures are values: `fetch_many` returns one `Result` per input URL and
//! never panics or propagates.

use std::time::Duration;

use futures::future::join_all;
use rand::seq::SliceRandom;
use reqwest::Client;
use tracing::{debug, warn};

use docharvest_shared::{DocHarvestError, Result};

use crate::browser::BrowserPage;

/// Per-request timeout for the HTTP client.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Desktop-Chrome pool the per-run User-Agent is drawn from.
const CHROME_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
];

/// Pick the User-Agent for a crawl run. Randomised once per run and reused
/// for every request in it.
pub fn pick_user_agent() -> &'static str {
    CHROME_USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(CHROME_USER_AGENTS[0])
}

/// Why one URL produced no HTML.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (DNS, connect, timeout, body read).
    #[error("request failed: {0}")]
    Http(String),

    /// The server answered, but not with an HTML 200.
    #[error("non-HTML response: HTTP {status} ({content_type})")]
    NotHtml { status: u16, content_type: String },

    /// The browser fallback failed.
    #[error("browser navigation failed: {0}")]
    Browser(String),

    /// Both transports failed for this URL.
    #[error("all transports failed: {0}")]
    Exhausted(String),
}

/// HTTP-first fetcher sharing one client (and one User-Agent) per run.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build the run's HTTP client: chosen User-Agent, redirects followed,
    /// 10-second per-request timeout.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| DocHarvestError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch one URL over plain HTTP.
    ///
    /// Accepted only when the status is 200 **and** the `Content-Type`
    /// contains `text/html`; anything else is a failure for this transport.
    pub async fn fetch_http(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if status != 200 || !content_type.contains("text/html") {
            return Err(FetchError::NotHtml {
                status,
                content_type,
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))
    }

    /// Fetch a batch of URLs, HTTP in parallel, browser fallback serialised.
    ///
    /// The returned vector is index-aligned with `urls`.
    pub async fn fetch_many(
        &self,
        urls: &[String],
        browser: Option<&BrowserPage>,
    ) -> Vec<std::result::Result<String, FetchError>> {
        let mut results = join_all(urls.iter().map(|url| self.fetch_http(url))).await;

        // The browser page is a single shared resource, so retries run one
        // at a time. That serialisation is the accepted cost of the
        // fallback path.
        for (index, slot) in results.iter_mut().enumerate() {
            let http_failure = match slot {
                Ok(html) if !html.is_empty() => continue,
                Ok(_) => "empty response body".to_string(),
                Err(e) => e.to_string(),
            };

            let url = &urls[index];
            let Some(page) = browser else {
                *slot = Err(FetchError::Exhausted(http_failure));
                continue;
            };

            debug!(url, reason = %http_failure, "falling back to browser");
            *slot = match page.fetch(url).await {
                Ok(html) => Ok(html),
                Err(browser_failure) => {
                    warn!(url, error = %browser_failure, "browser fallback failed");
                    Err(FetchError::Exhausted(format!(
                        "http: {http_failure}; browser: {browser_failure}"
                    )))
                }
            };
        }

        results
    }
}
