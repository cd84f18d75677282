//! Record persistence: JSON Lines for raw and normalized records, CSV and
//! Parquet for the normalized table.
//!
//! Absent fields are always written (`null` in JSON and Parquet, an empty
//! cell in CSV) so every row has the same shape. Both tabular writers use
//! [`NormalizedRecord::COLUMNS`] as their column order.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use arrow_array::{ArrayRef, Float64Array, RecordBatch, StringArray, TimestampMicrosecondArray};
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use b2bscout_core::{Currency, NormalizedRecord, RawRecord};
use parquet::arrow::ArrowWriter;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ScraperError;

/// Appends one JSON object per line to an underlying writer.
#[derive(Debug)]
pub struct JsonlWriter<W: Write> {
    inner: W,
    written: usize,
}

impl JsonlWriter<BufWriter<File>> {
    /// Creates (or truncates) `path`, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Io`] if the directory or file cannot be
    /// created.
    pub fn create(path: &Path) -> Result<Self, ScraperError> {
        ensure_parent_dir(path)?;
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Serializes `item` as a single line.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Json`] or [`ScraperError::Io`] on failure.
    pub fn write<T: Serialize>(&mut self, item: &T) -> Result<(), ScraperError> {
        serde_json::to_writer(&mut self.inner, item)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Lines written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes buffered output and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Io`] if the flush fails.
    pub fn finish(mut self) -> Result<W, ScraperError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reads every non-blank line of `path` as one JSON value.
///
/// # Errors
///
/// Returns [`ScraperError::Io`] if the file cannot be read and
/// [`ScraperError::Json`] for the first line that does not parse.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ScraperError> {
    let reader = BufReader::new(File::open(path)?);
    let mut items = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line).inspect_err(|e| {
            tracing::warn!(path = %path.display(), line = index + 1, error = %e, "malformed JSON line");
        })?;
        items.push(item);
    }
    Ok(items)
}

/// Reads raw records from several JSON Lines files, in argument order.
///
/// # Errors
///
/// Fails on the first file that cannot be read or parsed.
pub fn read_raw_records<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RawRecord>, ScraperError> {
    let mut records = Vec::new();
    for path in paths {
        let batch: Vec<RawRecord> = read_jsonl(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), records = batch.len(), "loaded raw records");
        records.extend(batch);
    }
    Ok(records)
}

/// Writes `records` to `path` as JSON Lines.
///
/// # Errors
///
/// Returns [`ScraperError::Io`] or [`ScraperError::Json`] on failure.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<usize, ScraperError> {
    let mut writer = JsonlWriter::create(path)?;
    for record in records {
        writer.write(record)?;
    }
    let written = writer.written();
    writer.finish()?;
    Ok(written)
}

/// Writes the normalized table to `path` as CSV with a fixed header row.
///
/// The header is written even when `records` is empty. Cells follow the
/// record's serde field order, which matches [`NormalizedRecord::COLUMNS`].
///
/// # Errors
///
/// Returns [`ScraperError::Io`] or [`ScraperError::Csv`] on failure.
pub fn write_csv(path: &Path, records: &[NormalizedRecord]) -> Result<usize, ScraperError> {
    ensure_parent_dir(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(NormalizedRecord::COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(records.len())
}

/// Writes the normalized table to `path` as a single-row-group Parquet file.
///
/// `captured_at` is stored as a UTC microsecond timestamp, prices as
/// `Float64`, everything else as UTF-8. Only `site`, `category` and
/// `captured_at` are non-nullable.
///
/// # Errors
///
/// Returns [`ScraperError::Io`], [`ScraperError::Arrow`] or
/// [`ScraperError::Parquet`] on failure.
pub fn write_parquet(path: &Path, records: &[NormalizedRecord]) -> Result<usize, ScraperError> {
    ensure_parent_dir(path)?;
    let batch = record_batch(records)?;

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(records.len())
}

/// Arrow schema of the normalized table, in [`NormalizedRecord::COLUMNS`]
/// order.
#[must_use]
pub fn table_schema() -> Schema {
    let fields: Vec<Field> = NormalizedRecord::COLUMNS
        .iter()
        .map(|&name| match name {
            "site" | "category" => Field::new(name, DataType::Utf8, false),
            "captured_at" => Field::new(
                name,
                DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
                false,
            ),
            "price_min" | "price_max" | "price_mid" => Field::new(name, DataType::Float64, true),
            _ => Field::new(name, DataType::Utf8, true),
        })
        .collect();
    Schema::new(fields)
}

fn record_batch(records: &[NormalizedRecord]) -> Result<RecordBatch, ScraperError> {
    let captured_at = TimestampMicrosecondArray::from(
        records
            .iter()
            .map(|r| r.captured_at.timestamp_micros())
            .collect::<Vec<_>>(),
    )
    .with_timezone("UTC");

    let columns: Vec<ArrayRef> = vec![
        utf8(records, |r| Some(r.site.as_str())),
        utf8(records, |r| Some(r.category.as_str())),
        utf8(records, |r| r.title.as_deref()),
        utf8(records, |r| r.price_raw.as_deref()),
        utf8(records, |r| r.min_order.as_deref()),
        utf8(records, |r| r.product_url.as_deref()),
        utf8(records, |r| r.company_name.as_deref()),
        utf8(records, |r| r.company_url.as_deref()),
        utf8(records, |r| r.location.as_deref()),
        utf8(records, |r| r.description.as_deref()),
        Arc::new(captured_at),
        float64(records, |r| r.price_min),
        float64(records, |r| r.price_max),
        utf8(records, |r| r.currency.map(Currency::code)),
        utf8(records, |r| r.city.as_deref()),
        utf8(records, |r| r.state.as_deref()),
        float64(records, |r| r.price_mid),
    ];

    Ok(RecordBatch::try_new(Arc::new(table_schema()), columns)?)
}

fn utf8(
    records: &[NormalizedRecord],
    field: impl Fn(&NormalizedRecord) -> Option<&str>,
) -> ArrayRef {
    Arc::new(records.iter().map(field).collect::<StringArray>())
}

fn float64(
    records: &[NormalizedRecord],
    field: impl Fn(&NormalizedRecord) -> Option<f64>,
) -> ArrayRef {
    Arc::new(records.iter().map(field).collect::<Float64Array>())
}

fn ensure_parent_dir(path: &Path) -> Result<(), ScraperError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
