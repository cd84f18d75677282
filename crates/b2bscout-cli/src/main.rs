mod crawl;
mod normalize;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "b2bscout")]
#[command(about = "Crawl B2B marketplace listings and normalize them for analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl every category in a categories file into a JSON Lines file
    Crawl(crawl::CrawlArgs),
    /// Normalize and deduplicate raw JSON Lines records into a CSV table
    Normalize(normalize::NormalizeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = b2bscout_core::load_app_config()?;
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Crawl(args) => crawl::run_crawl(&config, &args).await,
        Commands::Normalize(args) => normalize::run_normalize(&args),
    }
}

/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
