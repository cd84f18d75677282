use b2bscout_core::Site;
use futures::StreamExt;

use super::*;
use crate::extract::IndiamartExtractor;
use crate::testing::{crawler, empty_fetcher, listing, page_url, FakeFetcher, StaticPolicy};

async fn collect_all(
    crawler: &Crawler<StaticPolicy, FakeFetcher>,
    start_url: &str,
) -> Vec<Result<RawRecord, ScraperError>> {
    let extractor = IndiamartExtractor::new().unwrap();
    crawler
        .crawl_category(&extractor, "pumps", start_url)
        .collect()
        .await
}

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn follows_next_links_until_last_page() {
    let fetcher = FakeFetcher::new([
        (page_url(1), Ok(listing(1, 2, Some("?page=2")))),
        (page_url(2), Ok(listing(2, 2, Some("?page=3")))),
        (page_url(3), Ok(listing(3, 1, None))),
    ]);
    let counters = fetcher.counters.clone();
    let crawler = crawler(true, fetcher);

    let results = collect_all(&crawler, &page_url(1)).await;

    let titles: Vec<String> = results
        .into_iter()
        .map(|r| r.expect("no fetch errors").title.unwrap_or_default())
        .collect();
    assert_eq!(
        titles,
        vec!["Pump 1-0", "Pump 1-1", "Pump 2-0", "Pump 2-1", "Pump 3-0"]
    );
    assert_eq!(counters.fetched(), vec![page_url(1), page_url(2), page_url(3)]);
    assert_eq!(counters.opened(), 1);
    assert_eq!(counters.closed(), 1);
}

#[tokio::test]
async fn records_carry_site_and_category() {
    let fetcher = FakeFetcher::new([(page_url(1), Ok(listing(1, 1, None)))]);
    let crawler = crawler(true, fetcher);

    let results = collect_all(&crawler, &page_url(1)).await;
    let record = results[0].as_ref().unwrap();
    assert_eq!(record.site, Site::Indiamart);
    assert_eq!(record.category, "pumps");
    assert_eq!(record.price_raw.as_deref(), Some("₹ 1,000"));
}

#[tokio::test]
async fn zero_cards_on_first_page_is_empty_and_not_an_error() {
    let fetcher = FakeFetcher::new([(page_url(1), Ok(listing(1, 0, Some("?page=2"))))]);
    let counters = fetcher.counters.clone();
    let crawler = crawler(true, fetcher);

    let results = collect_all(&crawler, &page_url(1)).await;

    assert!(results.is_empty());
    assert_eq!(counters.fetched().len(), 1);
    assert_eq!(counters.closed(), 1);
}

#[tokio::test]
async fn zero_cards_after_first_page_stops() {
    let fetcher = FakeFetcher::new([
        (page_url(1), Ok(listing(1, 3, Some("?page=2")))),
        (page_url(2), Ok(listing(2, 0, Some("?page=3")))),
    ]);
    let counters = fetcher.counters.clone();
    let crawler = crawler(true, fetcher);

    let results = collect_all(&crawler, &page_url(1)).await;

    assert_eq!(results.len(), 3);
    assert_eq!(counters.fetched().len(), 2);
}

#[tokio::test]
async fn page_cap_bounds_an_endless_listing() {
    let pages = (1..=20).map(|n| {
        let next = format!("?page={}", n + 1);
        (page_url(n), Ok::<_, String>(listing(n, 1, Some(next.as_str()))))
    });
    let fetcher = FakeFetcher::new(pages.collect::<Vec<_>>());
    let counters = fetcher.counters.clone();
    let crawler = crawler(true, fetcher).with_max_pages(4);

    let results = collect_all(&crawler, &page_url(1)).await;

    assert_eq!(results.len(), 4);
    assert_eq!(counters.fetched().len(), 4);
    assert_eq!(counters.closed(), 1);
}

#[tokio::test]
async fn next_link_back_to_visited_page_stops() {
    let fetcher = FakeFetcher::new([
        (page_url(1), Ok(listing(1, 1, Some("?page=2")))),
        (page_url(2), Ok(listing(2, 1, Some("?page=1")))),
    ]);
    let counters = fetcher.counters.clone();
    let crawler = crawler(true, fetcher);

    let results = collect_all(&crawler, &page_url(1)).await;

    assert_eq!(results.len(), 2);
    assert_eq!(counters.fetched(), vec![page_url(1), page_url(2)]);
}

#[test]
fn max_pages_is_clamped() {
    let c = crawler(true, empty_fetcher()).with_max_pages(0);
    assert_eq!(c.max_pages(), 1);
    let c = crawler(true, empty_fetcher()).with_max_pages(50_000);
    assert_eq!(c.max_pages(), MAX_PAGES_HARD_CAP);
    let c = crawler(true, empty_fetcher());
    assert_eq!(c.max_pages(), MAX_PAGES_HARD_CAP);
}

// ---------------------------------------------------------------------------
// Policy gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn disallowed_start_url_yields_nothing() {
    let fetcher = FakeFetcher::new([(page_url(1), Ok(listing(1, 5, None)))]);
    let counters = fetcher.counters.clone();
    let crawler = crawler(false, fetcher);

    let results = collect_all(&crawler, &page_url(1)).await;

    assert!(results.is_empty());
    assert_eq!(counters.opened(), 0, "no session for a disallowed crawl");
    assert!(counters.fetched().is_empty());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_timeout_is_yielded_once_then_stream_ends() {
    // Page 2 is not served, so the fake times out on it.
    let fetcher = FakeFetcher::new([(page_url(1), Ok(listing(1, 2, Some("?page=2"))))]);
    let counters = fetcher.counters.clone();
    let crawler = crawler(true, fetcher);

    let results = collect_all(&crawler, &page_url(1)).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(
        matches!(&results[2], Err(ScraperError::FetchTimeout { url }) if *url == page_url(2)),
        "got: {:?}",
        results[2]
    );
    assert_eq!(counters.closed(), 1);
}

#[tokio::test]
async fn render_failure_on_first_page_aborts() {
    let fetcher = FakeFetcher::new([(page_url(1), Err("HTTP 503".to_owned()))]);
    let crawler = crawler(true, fetcher);

    let results = collect_all(&crawler, &page_url(1)).await;

    assert_eq!(results.len(), 1);
    assert!(matches!(
        &results[0],
        Err(ScraperError::RenderFailure { reason, .. }) if reason == "HTTP 503"
    ));
}

// ---------------------------------------------------------------------------
// Laziness and session lifetime
// ---------------------------------------------------------------------------

#[test]
fn nothing_happens_until_polled() {
    let fetcher = FakeFetcher::new([(page_url(1), Ok(listing(1, 1, None)))]);
    let counters = fetcher.counters.clone();
    let crawler = crawler(true, fetcher);
    let extractor = IndiamartExtractor::new().unwrap();

    let start = page_url(1);
    let stream = crawler.crawl_category(&extractor, "pumps", &start);
    assert_eq!(counters.opened(), 0);
    drop(stream);
    assert_eq!(counters.opened(), 0);
}

#[tokio::test]
async fn abandoning_stream_releases_session_without_fetching_more() {
    let fetcher = FakeFetcher::new([
        (page_url(1), Ok(listing(1, 3, Some("?page=2")))),
        (page_url(2), Ok(listing(2, 3, None))),
    ]);
    let counters = fetcher.counters.clone();
    let crawler = crawler(true, fetcher);
    let extractor = IndiamartExtractor::new().unwrap();

    let start = page_url(1);
    {
        let mut stream = std::pin::pin!(crawler.crawl_category(&extractor, "pumps", &start));
        let first = stream.next().await.expect("one record").unwrap();
        assert_eq!(first.title.as_deref(), Some("Pump 1-0"));
        assert_eq!(counters.closed(), 0, "session is live while streaming");
    }

    assert_eq!(counters.opened(), 1);
    assert_eq!(counters.closed(), 1);
    assert_eq!(counters.fetched(), vec![page_url(1)]);
}
