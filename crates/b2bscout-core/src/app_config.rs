use std::time::Duration;

use crate::crawl_config::CrawlConfig;

/// Absolute upper bound on pages walked per category. A runaway-loop guard
/// for listings whose "next" link cycles; never expected to be reached.
pub const MAX_PAGES_HARD_CAP: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: String,
    pub crawl_delay_secs: f64,
    pub crawl_jitter_secs: f64,
    pub headless: bool,
    pub concurrency: usize,
    pub user_agent: String,
    pub max_pages: usize,
    pub max_records_per_category: usize,
    pub robots_timeout_secs: u64,
    pub navigation_timeout_secs: u64,
    pub settle_delay_ms: u64,
}

impl AppConfig {
    /// The read-only crawl settings shared by every category in a run.
    #[must_use]
    pub fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig {
            delay: self.crawl_delay_secs,
            jitter: self.crawl_jitter_secs,
            headless: self.headless,
            concurrency: self.concurrency,
            user_agent: self.user_agent.clone(),
        }
    }

    #[must_use]
    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.robots_timeout_secs)
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
