//! Bulk normalization from [`RawRecord`] to [`NormalizedRecord`].
//!
//! Price and location parsing is delegated to [`crate::text`]; this module
//! handles field cleanup, derived columns, and duplicate removal.

use std::collections::HashSet;

use b2bscout_core::{NormalizedRecord, RawRecord, Site};

use crate::text::{clean_whitespace, extract_price, split_location};

/// Normalizes a single raw record.
///
/// `title`, `company_name`, `min_order`, `description` and `category` are
/// whitespace-cleaned. Absent text fields stay absent rather than becoming
/// empty strings.
#[must_use]
pub fn normalize_record(raw: RawRecord) -> NormalizedRecord {
    let price = extract_price(raw.price_raw.as_deref());
    let (city, state) = split_location(raw.location.as_deref());

    NormalizedRecord {
        site: raw.site,
        category: clean_whitespace(raw.category.as_str()),
        title: clean_optional(raw.title),
        price_raw: raw.price_raw,
        min_order: clean_optional(raw.min_order),
        product_url: raw.product_url,
        company_name: clean_optional(raw.company_name),
        company_url: raw.company_url,
        location: raw.location,
        description: clean_optional(raw.description),
        captured_at: raw.captured_at,
        price_min: price.min,
        price_max: price.max,
        currency: price.currency,
        city,
        state,
        price_mid: price.mid(),
    }
}

/// Normalizes a batch and drops duplicates, keeping the first occurrence.
#[must_use]
pub fn normalize_records(raw: impl IntoIterator<Item = RawRecord>) -> Vec<NormalizedRecord> {
    let normalized: Vec<NormalizedRecord> = raw.into_iter().map(normalize_record).collect();
    dedup_records(normalized)
}

/// Removes rows whose `(site, product_url, title, company_name)` exactly
/// matches an earlier row. Order of the surviving rows is preserved, so
/// running this twice is the same as running it once.
#[must_use]
pub fn dedup_records(records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    let mut seen: HashSet<DedupKey> = HashSet::with_capacity(records.len());
    let before = records.len();

    let kept: Vec<NormalizedRecord> = records
        .into_iter()
        .filter(|r| seen.insert(DedupKey::of(r)))
        .collect();

    if kept.len() < before {
        tracing::debug!(
            dropped = before - kept.len(),
            kept = kept.len(),
            "dropped duplicate records"
        );
    }
    kept
}

#[derive(Hash, PartialEq, Eq)]
struct DedupKey {
    site: Site,
    product_url: Option<String>,
    title: Option<String>,
    company_name: Option<String>,
}

impl DedupKey {
    fn of(record: &NormalizedRecord) -> Self {
        Self {
            site: record.site,
            product_url: record.product_url.clone(),
            title: record.title.clone(),
            company_name: record.company_name.clone(),
        }
    }
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value.map(|v| clean_whitespace(v.as_str()))
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
