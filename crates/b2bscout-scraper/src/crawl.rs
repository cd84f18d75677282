//! The fetch, extract, follow-link loop for one category.

use std::collections::HashSet;

use async_stream::stream;
use b2bscout_core::{CrawlConfig, RawRecord, MAX_PAGES_HARD_CAP};
use futures::Stream;

use crate::error::ScraperError;
use crate::extract::SiteExtractor;
use crate::fetch::{FetchSession, PageFetcher};
use crate::robots::CrawlPolicy;
use crate::throttle::Throttle;

/// Drives category crawls with one policy gate and one page fetcher.
#[derive(Debug)]
pub struct Crawler<P, F> {
    policy: P,
    fetcher: F,
    config: CrawlConfig,
    throttle: Throttle,
    max_pages: usize,
}

impl<P, F> Crawler<P, F>
where
    P: CrawlPolicy,
    F: PageFetcher,
{
    #[must_use]
    pub fn new(policy: P, fetcher: F, config: CrawlConfig) -> Self {
        let throttle = Throttle::from_config(&config);
        Self {
            policy,
            fetcher,
            config,
            throttle,
            max_pages: MAX_PAGES_HARD_CAP,
        }
    }

    /// Lowers the page cap. Values are clamped to `1..=MAX_PAGES_HARD_CAP`.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.clamp(1, MAX_PAGES_HARD_CAP);
        self
    }

    #[must_use]
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    #[must_use]
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Lazily crawls one category starting at `start_url`.
    ///
    /// The policy gate is consulted once; a disallowed start URL produces an
    /// empty stream. Otherwise pages are fetched one at a time as the stream
    /// is polled. The crawl ends when a page has no cards, has no usable next
    /// link, links back to a page already visited, or the page cap is
    /// reached. The page cap is a runaway guard, not an expected exit.
    ///
    /// A fetch error is yielded once and ends the stream. Dropping the
    /// stream at any point releases the fetch session.
    pub fn crawl_category<'a>(
        &'a self,
        extractor: &'a dyn SiteExtractor,
        category: &'a str,
        start_url: &'a str,
    ) -> impl Stream<Item = Result<RawRecord, ScraperError>> + 'a {
        stream! {
            let site = extractor.site();

            if !self.policy.is_allowed(start_url, &self.config.user_agent).await {
                tracing::info!(%site, category, start_url, "crawl disallowed by robots.txt; skipping");
                return;
            }

            let mut session = match self.fetcher.open_session(&self.config).await {
                Ok(session) => session,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            tracing::info!(%site, category, start_url, "crawling category");

            let mut url = start_url.to_owned();
            let mut visited = HashSet::new();

            for page in 1..=self.max_pages {
                visited.insert(url.clone());

                let html = match session.fetch(&url).await {
                    Ok(html) => html,
                    Err(e) => {
                        tracing::warn!(%site, category, page, url = %url, error = %e, "page fetch failed; aborting category");
                        yield Err(e);
                        return;
                    }
                };

                let extracted = extractor.extract(&html, &url, category);
                tracing::debug!(
                    %site,
                    category,
                    page,
                    url = %url,
                    records = extracted.records.len(),
                    has_next = extracted.next_url.is_some(),
                    "page extracted"
                );

                if extracted.records.is_empty() {
                    tracing::debug!(category, page, "no listing cards; end of category");
                    return;
                }

                for record in extracted.records {
                    yield Ok(record);
                }

                let Some(next_url) = extracted.next_url else {
                    tracing::debug!(category, page, "no next page link; end of category");
                    return;
                };

                if visited.contains(&next_url) {
                    tracing::debug!(category, page, next_url = %next_url, "next link revisits a crawled page; stopping");
                    return;
                }

                if page == self.max_pages {
                    tracing::warn!(category, max_pages = self.max_pages, "page cap reached; stopping");
                    return;
                }

                self.throttle.wait().await;
                url = next_url;
            }
        }
    }
}

#[cfg(test)]
#[path = "crawl_test.rs"]
mod tests;
