//! Pure string helpers that turn scraped text into typed fields.
//!
//! Price parsing is heuristic by nature: listing cards mix currency markers,
//! ranges, units and quantities in one free-text string. Nothing here fails:
//! a string that cannot be understood yields `None` fields.

use std::sync::LazyLock;

use b2bscout_core::Currency;
use regex::Regex;

/// Digits with optional thousands separators and an optional fraction,
/// e.g. `5,000`, `12000`, `2.5`, `1,25,000.00`.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+[\d,]*\.?\d*").expect("valid number regex"));

/// Currency markers checked in order. Every marker found is stripped from the
/// text and the last match wins, so a string mixing `₹` and `$` reports USD.
const CURRENCY_MARKERS: [(&str, Currency); 7] = [
    ("₹", Currency::Inr),
    ("Rs", Currency::Inr),
    ("INR", Currency::Inr),
    ("$", Currency::Usd),
    ("USD", Currency::Usd),
    ("€", Currency::Eur),
    ("EUR", Currency::Eur),
];

/// Result of [`extract_price`]. `min <= max` whenever both are present.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<Currency>,
}

impl PriceRange {
    /// Arithmetic mean of the bounds, when both are known.
    #[must_use]
    pub fn mid(&self) -> Option<f64> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            _ => None,
        }
    }
}

/// Collapses every whitespace run to a single space and trims both ends.
/// `None` yields an empty string.
#[must_use]
pub fn clean_whitespace<'a>(s: impl Into<Option<&'a str>>) -> String {
    s.into()
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Extracts a `(min, max, currency)` triple from a free-text price.
///
/// - `"₹ 5,000 - ₹ 7,500 / Piece"` → `5000..7500 INR`
/// - `"$2.5 - $3.1 / kg"` → `2.5..3.1 USD`
/// - `"₹ 12,000 / Unit"` → `12000..12000 INR`
///
/// With two or more numbers the range spans the smallest and largest number
/// anywhere in the string, so an embedded quantity such as `"Pack of 500"`
/// widens the range. Callers must treat the result as best-effort.
#[must_use]
pub fn extract_price(raw: Option<&str>) -> PriceRange {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return PriceRange::default();
    };

    let mut text = clean_whitespace(raw);
    let mut currency = None;
    for (marker, code) in CURRENCY_MARKERS {
        if text.contains(marker) {
            currency = Some(code);
            text = text.replace(marker, "");
        }
    }

    let values: Vec<f64> = NUMBER_RE
        .find_iter(&text)
        .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .collect();

    let Some(&first) = values.first() else {
        return PriceRange {
            currency,
            ..PriceRange::default()
        };
    };

    let (min, max) = values
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    PriceRange {
        min: Some(min),
        max: Some(max),
        currency,
    }
}

/// Splits `"City, State"` on the first comma. Each side is trimmed and an
/// empty side becomes `None`; text without a comma is all city.
#[must_use]
pub fn split_location(raw: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(raw) = raw else {
        return (None, None);
    };

    match raw.split_once(',') {
        Some((city, state)) => (non_empty(city), non_empty(state)),
        None => (non_empty(raw), None),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
#[path = "text_test.rs"]
mod tests;
