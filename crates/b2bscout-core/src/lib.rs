pub mod app_config;
pub mod categories;
pub mod config;
pub mod crawl_config;
pub mod records;

pub use app_config::{AppConfig, MAX_PAGES_HARD_CAP};
pub use categories::{load_categories, parse_categories, Categories, Category, CategoryFormat};
pub use config::{load_app_config, load_app_config_from_env};
pub use crawl_config::{CrawlConfig, DEFAULT_USER_AGENT};
pub use records::{Currency, NormalizedRecord, RawRecord, Site};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(String),

    #[error("categories validation error: {0}")]
    Validation(String),
}
