//! In-memory fakes shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use b2bscout_core::CrawlConfig;

use crate::crawl::Crawler;
use crate::error::ScraperError;
use crate::fetch::{FetchSession, PageFetcher};
use crate::robots::CrawlPolicy;

pub const BASE: &str = "https://dir.indiamart.com/impcat/pumps.html";

pub fn page_url(n: usize) -> String {
    format!("{BASE}?page={n}")
}

/// IndiaMART-shaped listing page with `cards` cards and an optional
/// `rel="next"` href.
pub fn listing(page: usize, cards: usize, next_href: Option<&str>) -> String {
    let mut html = String::from("<html><body>");
    for i in 0..cards {
        html.push_str(&format!(
            r#"<div class="cl"><a class="lcname" href="/p/{page}-{i}">Pump {page}-{i}</a>
               <span class="prc">₹ 1,000</span></div>"#
        ));
    }
    if let Some(href) = next_href {
        html.push_str(&format!(r#"<a rel="next" href="{href}">Next</a>"#));
    }
    html.push_str("</body></html>");
    html
}

pub struct StaticPolicy(pub bool);

#[async_trait]
impl CrawlPolicy for StaticPolicy {
    async fn is_allowed(&self, _url: &str, _user_agent: &str) -> bool {
        self.0
    }
}

#[derive(Default, Clone)]
pub struct Counters {
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub fetched: Arc<Mutex<Vec<String>>>,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

/// Serves canned pages. URLs missing from the map time out.
pub struct FakeFetcher {
    pages: HashMap<String, Result<String, String>>,
    pub counters: Counters,
}

impl FakeFetcher {
    pub fn new(pages: impl IntoIterator<Item = (String, Result<String, String>)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            counters: Counters::default(),
        }
    }
}

pub struct FakeSession {
    pages: HashMap<String, Result<String, String>>,
    counters: Counters,
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    type Session = FakeSession;

    async fn open_session(&self, _config: &CrawlConfig) -> Result<FakeSession, ScraperError> {
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            pages: self.pages.clone(),
            counters: self.counters.clone(),
        })
    }
}

#[async_trait]
impl FetchSession for FakeSession {
    async fn fetch(&mut self, url: &str) -> Result<String, ScraperError> {
        self.counters.fetched.lock().unwrap().push(url.to_owned());
        match self.pages.get(url) {
            Some(Ok(html)) => Ok(html.clone()),
            Some(Err(reason)) => Err(ScraperError::RenderFailure {
                url: url.to_owned(),
                reason: reason.clone(),
            }),
            None => Err(ScraperError::FetchTimeout {
                url: url.to_owned(),
            }),
        }
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn empty_fetcher() -> FakeFetcher {
    FakeFetcher::new(Vec::new())
}

pub fn no_wait_config() -> CrawlConfig {
    CrawlConfig {
        delay: 0.0,
        jitter: 0.0,
        ..CrawlConfig::default()
    }
}

pub fn crawler(allowed: bool, fetcher: FakeFetcher) -> Crawler<StaticPolicy, FakeFetcher> {
    Crawler::new(StaticPolicy(allowed), fetcher, no_wait_config())
}
