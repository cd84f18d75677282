pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod output;
pub mod pagination;
pub mod robots;
pub mod run;
pub mod text;
pub mod throttle;

#[cfg(test)]
mod testing;

pub use crawl::Crawler;
pub use error::ScraperError;
pub use extract::{extractor_for, ExtractedPage, SiteExtractor};
pub use fetch::{FetchSession, HttpFetcher, PageFetcher};
pub use normalize::{dedup_records, normalize_record, normalize_records};
pub use output::{
    read_jsonl, read_raw_records, table_schema, write_csv, write_jsonl, write_parquet, JsonlWriter,
};
pub use robots::{CrawlPolicy, PolicyGate};
pub use run::{crawl_run, RunSummary};
pub use text::{clean_whitespace, extract_price, split_location, PriceRange};
pub use throttle::Throttle;
