//! `crawl` command: categories file in, raw JSON Lines out.

use std::path::PathBuf;

use anyhow::Context;
use b2bscout_core::{load_categories, AppConfig, CrawlConfig, Site, MAX_PAGES_HARD_CAP};
use b2bscout_scraper::{crawl_run, extractor_for, Crawler, HttpFetcher, JsonlWriter, PolicyGate};
use clap::Args;

#[derive(Debug, Args)]
pub struct CrawlArgs {
    /// Marketplace to crawl (indiamart or alibaba)
    #[arg(long)]
    pub site: Site,

    /// JSON or YAML file mapping category name to start URL
    #[arg(long)]
    pub categories: PathBuf,

    /// Output JSON Lines file for raw records
    #[arg(long)]
    pub out: PathBuf,

    /// Mean delay between page fetches in seconds (jitter becomes 30% of it)
    #[arg(long)]
    pub delay: Option<f64>,

    /// Maximum pages per category
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Maximum records per category
    #[arg(long)]
    pub max_records: Option<usize>,

    /// Render pages with a visible browser window
    #[arg(long)]
    pub no_headless: bool,
}

/// Effective settings for one crawl invocation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CrawlSettings {
    pub crawl: CrawlConfig,
    pub max_pages: usize,
    pub max_records: usize,
}

impl CrawlSettings {
    /// Applies command-line overrides on top of the environment config.
    pub(crate) fn resolve(config: &AppConfig, args: &CrawlArgs) -> anyhow::Result<Self> {
        let mut crawl = config.crawl_config();

        if let Some(delay) = args.delay {
            if !delay.is_finite() || delay < 0.0 {
                anyhow::bail!("--delay must be a non-negative number of seconds, got {delay}");
            }
            let derived = CrawlConfig::with_delay(delay, crawl.headless);
            crawl.delay = derived.delay;
            crawl.jitter = derived.jitter;
        }
        if args.no_headless {
            crawl.headless = false;
        }

        let max_pages = match args.max_pages {
            Some(0) => anyhow::bail!("--max-pages must be at least 1"),
            Some(n) => n.min(MAX_PAGES_HARD_CAP),
            None => config.max_pages,
        };

        Ok(Self {
            crawl,
            max_pages,
            max_records: args.max_records.unwrap_or(config.max_records_per_category),
        })
    }
}

/// Crawls every category in `args.categories` and streams the records to
/// `args.out` as they arrive.
///
/// # Errors
///
/// Returns an error if the categories file or configuration is invalid, the
/// output file cannot be written, or every category failed. Individual
/// category failures are logged and skipped.
pub(crate) async fn run_crawl(config: &AppConfig, args: &CrawlArgs) -> anyhow::Result<()> {
    let settings = CrawlSettings::resolve(config, args)?;
    let categories = load_categories(&args.categories)
        .with_context(|| format!("loading categories from {}", args.categories.display()))?;

    if categories.is_empty() {
        tracing::warn!(path = %args.categories.display(), "categories file is empty; nothing to crawl");
        return Ok(());
    }

    let extractor = extractor_for(args.site)?;
    let gate = PolicyGate::new(config.robots_timeout()).context("building robots.txt client")?;
    let fetcher = HttpFetcher::new()
        .with_navigation_timeout(config.navigation_timeout())
        .with_settle_delay(config.settle_delay());
    let crawler = Crawler::new(gate, fetcher, settings.crawl).with_max_pages(settings.max_pages);

    let mut writer = JsonlWriter::create(&args.out)
        .with_context(|| format!("creating output file {}", args.out.display()))?;

    tracing::info!(
        site = %args.site,
        categories = categories.len(),
        max_pages = crawler.max_pages(),
        max_records = settings.max_records,
        out = %args.out.display(),
        "starting crawl"
    );

    let summary = crawl_run(
        &crawler,
        extractor.as_ref(),
        &categories,
        settings.max_records,
        |record| writer.write(&record),
    )
    .await
    .with_context(|| format!("writing records to {}", args.out.display()))?;

    writer
        .finish()
        .with_context(|| format!("flushing {}", args.out.display()))?;

    println!(
        "crawled {} records from {}/{} categories into {}",
        summary.records,
        summary.succeeded,
        summary.categories,
        args.out.display()
    );

    if summary.failed == summary.categories {
        anyhow::bail!("all {} categories failed", summary.failed);
    }

    Ok(())
}
