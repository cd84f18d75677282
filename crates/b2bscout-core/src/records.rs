//! Listing records as they move through the pipeline.
//!
//! A [`RawRecord`] is produced once per listing card by a site extractor and
//! is never mutated afterwards. [`NormalizedRecord`] is the analysis-ready row
//! built from it in bulk by the scraper crate's normalizer.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source marketplace a record was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Indiamart,
    Alibaba,
}

impl Site {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Site::Indiamart => "indiamart",
            Site::Alibaba => "alibaba",
        }
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indiamart" => Ok(Site::Indiamart),
            "alibaba" => Ok(Site::Alibaba),
            other => Err(format!(
                "unsupported site '{other}'; expected one of: indiamart, alibaba"
            )),
        }
    }
}

/// Currency codes recognised by the price parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
}

impl Currency {
    /// ISO 4217 code, e.g. `"INR"`.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One listing card as scraped from a category page.
///
/// `site` and `category` are always set. Every scraped field is optional:
/// `None` means the element was not found on the card, not that extraction
/// failed. Absent fields serialize as `null` rather than being omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub site: Site,
    /// Caller-supplied category name, e.g. `"industrial-pumps"`.
    pub category: String,
    pub title: Option<String>,
    /// Price text exactly as displayed, e.g. `"₹ 5,000 - ₹ 7,500 / Piece"`.
    pub price_raw: Option<String>,
    /// Minimum order text, e.g. `"10 Pieces (MOQ)"`.
    pub min_order: Option<String>,
    pub product_url: Option<String>,
    pub company_name: Option<String>,
    pub company_url: Option<String>,
    /// Free-text supplier location, usually `"City, State"`.
    pub location: Option<String>,
    /// Not populated by the current extractors.
    #[serde(default)]
    pub description: Option<String>,
    /// When the card was extracted (not when it was normalized).
    pub captured_at: DateTime<Utc>,
}

impl RawRecord {
    /// Creates a record with only `site`, `category` and the capture
    /// timestamp set.
    #[must_use]
    pub fn new(site: Site, category: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            site,
            category: category.into(),
            title: None,
            price_raw: None,
            min_order: None,
            product_url: None,
            company_name: None,
            company_url: None,
            location: None,
            description: None,
            captured_at,
        }
    }
}

/// A [`RawRecord`] plus the fields derived during normalization.
///
/// `price_min <= price_max` whenever both are present, and `price_mid` is
/// their arithmetic mean (or `None` when either bound is missing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub site: Site,
    pub category: String,
    pub title: Option<String>,
    pub price_raw: Option<String>,
    pub min_order: Option<String>,
    pub product_url: Option<String>,
    pub company_name: Option<String>,
    pub company_url: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub captured_at: DateTime<Utc>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub currency: Option<Currency>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub price_mid: Option<f64>,
}

impl NormalizedRecord {
    /// Column names in output order, shared by every tabular writer.
    pub const COLUMNS: [&'static str; 17] = [
        "site",
        "category",
        "title",
        "price_raw",
        "min_order",
        "product_url",
        "company_name",
        "company_url",
        "location",
        "description",
        "captured_at",
        "price_min",
        "price_max",
        "currency",
        "city",
        "state",
        "price_mid",
    ];
}
