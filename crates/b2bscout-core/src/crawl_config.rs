/// Desktop Chrome user agent sent with policy checks and page fetches.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Share of `delay` used as the jitter standard deviation when none is given.
const DEFAULT_JITTER_RATIO: f64 = 0.3;

/// Per-run crawl settings.
///
/// Built once per invocation and shared read-only by every category crawl in
/// that run.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlConfig {
    /// Target mean delay between page fetches, in seconds.
    pub delay: f64,
    /// Standard deviation of the inter-page delay, in seconds.
    pub jitter: f64,
    /// Render mode for browser-backed fetchers.
    pub headless: bool,
    /// Reserved. Categories are crawled one at a time.
    pub concurrency: usize,
    pub user_agent: String,
}

impl CrawlConfig {
    /// Builds a config around `delay` with jitter at 30% of the delay.
    #[must_use]
    pub fn with_delay(delay: f64, headless: bool) -> Self {
        Self {
            delay,
            jitter: delay * DEFAULT_JITTER_RATIO,
            headless,
            ..Self::default()
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            delay: 3.0,
            jitter: 1.0,
            headless: true,
            concurrency: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
