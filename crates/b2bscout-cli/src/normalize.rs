//! `normalize` command: raw JSON Lines in, deduplicated table out.

use std::path::PathBuf;

use anyhow::Context;
use b2bscout_scraper::{
    normalize_records, read_raw_records, write_csv, write_jsonl, write_parquet,
};
use clap::Args;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Raw JSON Lines files produced by `crawl`
    #[arg(long, required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output CSV path
    #[arg(long)]
    pub out_csv: PathBuf,

    /// Output Parquet path for the same table
    #[arg(long)]
    pub out_parquet: PathBuf,

    /// Also write the normalized rows as JSON Lines
    #[arg(long)]
    pub out_jsonl: Option<PathBuf>,
}

/// Loads every input, normalizes and deduplicates the records, and writes the
/// resulting table. Every output is written from the same rows.
///
/// # Errors
///
/// Returns an error if any input cannot be read or parsed, or an output
/// cannot be written.
pub(crate) fn run_normalize(args: &NormalizeArgs) -> anyhow::Result<()> {
    let raw = read_raw_records(&args.inputs).context("reading raw records")?;
    let raw_count = raw.len();

    let rows = normalize_records(raw);

    let written = write_csv(&args.out_csv, &rows)
        .with_context(|| format!("writing {}", args.out_csv.display()))?;

    write_parquet(&args.out_parquet, &rows)
        .with_context(|| format!("writing {}", args.out_parquet.display()))?;

    if let Some(path) = &args.out_jsonl {
        write_jsonl(path, &rows).with_context(|| format!("writing {}", path.display()))?;
    }

    tracing::info!(
        inputs = args.inputs.len(),
        raw = raw_count,
        rows = written,
        duplicates = raw_count - written,
        "normalization complete"
    );
    println!(
        "wrote {written} rows to {} and {}",
        args.out_csv.display(),
        args.out_parquet.display()
    );

    Ok(())
}
