//! Page fetching behind a session abstraction.
//!
//! A [`PageFetcher`] opens one [`FetchSession`] per category crawl. The
//! session owns all per-crawl state (cookies, connections, browser handles)
//! and releases it when dropped, which covers normal completion, errors, and
//! a consumer abandoning the record stream halfway through. Sessions are
//! never shared between concurrent crawls.

use std::time::Duration;

use async_trait::async_trait;
use b2bscout_core::CrawlConfig;
use reqwest::Client;

use crate::error::ScraperError;

/// Fixed grace period after the page has loaded, giving lazily inserted
/// listing cards time to appear before the markup is captured.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Navigation timeout. Exceeding it aborts the category crawl.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Opens isolated fetch sessions.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Session: FetchSession;

    /// Opens a fresh session configured from `config` (user agent, render mode).
    async fn open_session(&self, config: &CrawlConfig) -> Result<Self::Session, ScraperError>;
}

/// A live fetch context. Dropping it releases every resource it holds.
#[async_trait]
pub trait FetchSession: Send {
    /// Navigates to `url`, waits for the document to load, sleeps the settle
    /// delay, and returns the rendered markup.
    ///
    /// Failures are not retried: a timeout yields
    /// [`ScraperError::FetchTimeout`] and any other unusable response yields
    /// [`ScraperError::RenderFailure`] or [`ScraperError::Http`].
    async fn fetch(&mut self, url: &str) -> Result<String, ScraperError>;
}

/// [`PageFetcher`] that loads pages over plain HTTP.
///
/// "Document loaded" is the point where the full response body has been
/// received; no script runs, so `headless` has no effect here.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    navigation_timeout: Duration,
    settle_delay: Duration,
}

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            navigation_timeout: NAVIGATION_TIMEOUT,
            settle_delay: SETTLE_DELAY,
        }
    }

    #[must_use]
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    type Session = HttpSession;

    async fn open_session(&self, config: &CrawlConfig) -> Result<HttpSession, ScraperError> {
        // A dedicated client per session keeps cookie jars and connection
        // pools from leaking between crawls.
        let client = Client::builder()
            .timeout(self.navigation_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()?;

        tracing::debug!(headless = config.headless, "fetch session opened");

        Ok(HttpSession {
            client,
            settle_delay: self.settle_delay,
            pages_fetched: 0,
        })
    }
}

/// Session created by [`HttpFetcher`].
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
    settle_delay: Duration,
    pages_fetched: usize,
}

#[async_trait]
impl FetchSession for HttpSession {
    async fn fetch(&mut self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::RenderFailure {
                url: url.to_owned(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| classify(url, e))?;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        self.pages_fetched += 1;

        Ok(body)
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        tracing::debug!(pages = self.pages_fetched, "fetch session closed");
    }
}

fn classify(url: &str, err: reqwest::Error) -> ScraperError {
    if err.is_timeout() {
        ScraperError::FetchTimeout {
            url: url.to_owned(),
        }
    } else {
        ScraperError::Http(err)
    }
}
