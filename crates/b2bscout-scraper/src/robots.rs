//! Lightweight `robots.txt` gate consulted once before each category crawl.
//!
//! Only the default `User-agent: *` group is honoured and only its
//! `Disallow:` prefixes are applied. Agent-specific groups, `Allow:` lines and
//! wildcards are ignored.
//!
//! The gate fails open: when `robots.txt` cannot be fetched, times out, or
//! answers with anything other than HTTP 200, the URL is treated as allowed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::ScraperError;

/// Timeout applied to the `robots.txt` request.
pub const ROBOTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Permission check consulted by the crawl driver before fetching a category.
#[async_trait]
pub trait CrawlPolicy: Send + Sync {
    async fn is_allowed(&self, url: &str, user_agent: &str) -> bool;
}

/// [`CrawlPolicy`] backed by the target host's `robots.txt`. Nothing is
/// cached; every call performs one request.
#[derive(Debug, Clone)]
pub struct PolicyGate {
    client: Client,
}

impl PolicyGate {
    /// Builds a gate whose `robots.txt` requests time out after `timeout`.
    ///
    /// Redirects are not followed, so a redirected `robots.txt` counts as a
    /// non-200 answer.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Fetches and parses the `robots.txt` governing `url`.
    ///
    /// Returns `Ok(None)` when the file is not available (non-200).
    async fn fetch_disallows(
        &self,
        url: &Url,
        user_agent: &str,
    ) -> Result<Option<Vec<String>>, ScraperError> {
        let robots = robots_url(url)?;
        let response = self
            .client
            .get(robots.as_str())
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            tracing::warn!(
                robots_url = %robots,
                status = response.status().as_u16(),
                "robots.txt unavailable; allowing"
            );
            return Ok(None);
        }

        let body = response.text().await?;
        Ok(Some(default_group_disallows(&body)))
    }
}

#[async_trait]
impl CrawlPolicy for PolicyGate {
    async fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(url, error = %e, "cannot parse URL for robots check; allowing");
                return true;
            }
        };

        match self.fetch_disallows(&parsed, user_agent).await {
            Ok(Some(disallows)) => {
                let path = request_path(&parsed);
                let allowed = !is_path_disallowed(path, &disallows);
                if allowed {
                    tracing::debug!(url, path, "robots.txt allows crawling");
                } else {
                    tracing::info!(url, path, "robots.txt disallows crawling");
                }
                allowed
            }
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(url, error = %e, "robots.txt check failed; allowing");
                true
            }
        }
    }
}

/// Builds `{scheme}://{host[:port]}/robots.txt` for `url`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] for URLs without a host
/// (e.g. `data:` or `mailto:`).
pub fn robots_url(url: &Url) -> Result<Url, ScraperError> {
    if url.host_str().is_none() {
        return Err(ScraperError::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
        });
    }
    url.join("/robots.txt")
        .map_err(|e| ScraperError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

/// Collects the `Disallow:` values of every `User-agent: *` group.
///
/// Each `User-agent:` line switches the active group, so in a stacked group
/// (`User-agent: foo` followed by `User-agent: *`) the last line decides.
/// Field names are case-insensitive; blank lines and `#` comments are
/// skipped.
#[must_use]
pub fn default_group_disallows(body: &str) -> Vec<String> {
    let mut disallows = Vec::new();
    let mut in_default_group = false;

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let field = field.trim().to_ascii_lowercase();
        let value = value.trim();

        if field == "user-agent" {
            in_default_group = value == "*";
        } else if in_default_group && field == "disallow" {
            disallows.push(value.to_owned());
        }
    }

    disallows
}

/// Returns `true` when `path` starts with any non-empty disallowed prefix.
#[must_use]
pub fn is_path_disallowed(path: &str, disallows: &[String]) -> bool {
    disallows
        .iter()
        .filter(|d| !d.is_empty())
        .any(|d| path.starts_with(d.as_str()))
}

fn request_path(url: &Url) -> &str {
    match url.path() {
        "" => "/",
        p => p,
    }
}
