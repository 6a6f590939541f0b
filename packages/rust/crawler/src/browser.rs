//! Headless-browser fallback transport.
//!
//! One Chromium instance and one page are launched per crawl run and live
//! until the run ends. The page is mutated only by the fetcher's fallback
//! path, which already runs serially, so no locking is needed here.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use docharvest_shared::{DocHarvestError, Result};

use crate::fetcher::FetchError;

/// Timeout for one navigation (goto + load) in the fallback path.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(15);

/// A launched browser with its single shared page.
pub struct BrowserPage {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl BrowserPage {
    /// Launch headless Chromium and open the run's page.
    ///
    /// Fails when no Chromium binary is available; callers are expected to
    /// degrade to HTTP-only fetching in that case.
    pub async fn launch() -> Result<Self> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(DocHarvestError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DocHarvestError::Browser(e.to_string()))?;

        // The handler drives the CDP connection; it must be polled for the
        // lifetime of the browser.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DocHarvestError::Browser(e.to_string()))?;

        debug!("headless browser ready");
        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Navigate the shared page to `url` and return the rendered HTML.
    pub async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let navigation = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?;
            Ok::<(), FetchError>(())
        };

        tokio::time::timeout(NAVIGATION_TIMEOUT, navigation)
            .await
            .map_err(|_| {
                FetchError::Browser(format!(
                    "navigation timed out after {}s",
                    NAVIGATION_TIMEOUT.as_secs()
                ))
            })??;

        self.page
            .content()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))
    }

    /// Shut the browser down at the end of the run.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "browser close failed");
        }
        self.handler_task.abort();
    }
}
