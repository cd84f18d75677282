//! Multi-category crawl orchestration.
//!
//! Categories are crawled one after another, each with its own fetch
//! session. A category that fails is logged and counted; the run moves on to
//! the next one. Only a sink failure (e.g. the output file becoming
//! unwritable) stops the whole run.

use std::pin::pin;

use b2bscout_core::{Categories, RawRecord};
use futures::StreamExt;

use crate::crawl::Crawler;
use crate::error::ScraperError;
use crate::extract::SiteExtractor;
use crate::fetch::PageFetcher;
use crate::robots::CrawlPolicy;

/// Totals reported by [`crawl_run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Categories attempted.
    pub categories: usize,
    /// Categories whose crawl ended without a fetch error, including
    /// disallowed and empty ones.
    pub succeeded: usize,
    pub failed: usize,
    /// Records handed to the sink across all categories.
    pub records: usize,
}

/// Crawls every category in order, passing each record to `sink` as soon as
/// it is extracted.
///
/// At most `max_records_per_category` records are taken from one category;
/// once the cap is hit the category's stream is dropped, which stops further
/// page fetches and closes its session.
///
/// # Errors
///
/// Returns the first error produced by `sink`. Crawl errors are not
/// returned; they mark the category as failed.
pub async fn crawl_run<P, F, S>(
    crawler: &Crawler<P, F>,
    extractor: &dyn SiteExtractor,
    categories: &Categories,
    max_records_per_category: usize,
    mut sink: S,
) -> Result<RunSummary, ScraperError>
where
    P: CrawlPolicy,
    F: PageFetcher,
    S: FnMut(RawRecord) -> Result<(), ScraperError>,
{
    let mut summary = RunSummary {
        categories: categories.len(),
        ..RunSummary::default()
    };

    for category in categories {
        let mut records = pin!(crawler
            .crawl_category(extractor, &category.name, &category.start_url)
            .take(max_records_per_category));

        let mut count = 0_usize;
        let mut failure = None;

        while let Some(item) = records.next().await {
            match item {
                Ok(record) => {
                    sink(record)?;
                    count += 1;
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        summary.records += count;
        match failure {
            None => {
                if count == max_records_per_category {
                    tracing::info!(
                        category = %category.name,
                        cap = max_records_per_category,
                        "record cap reached for category"
                    );
                }
                tracing::info!(category = %category.name, records = count, "category complete");
                summary.succeeded += 1;
            }
            Some(e) => {
                tracing::error!(
                    category = %category.name,
                    records = count,
                    error = %e,
                    "category crawl aborted"
                );
                summary.failed += 1;
            }
        }
    }

    if summary.failed > 0 {
        tracing::warn!(
            failed = summary.failed,
            total = summary.categories,
            "some categories failed during the run"
        );
    }
    tracing::info!(
        site = %extractor.site(),
        categories = summary.categories,
        succeeded = summary.succeeded,
        failed = summary.failed,
        records = summary.records,
        "crawl run finished"
    );

    Ok(summary)
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
