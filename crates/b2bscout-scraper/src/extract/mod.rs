//! Listing-card extraction shared by every supported marketplace.
//!
//! Each site supplies a [`SelectorTable`]; the parsing flow in
//! [`extract_listing`] is the same for all of them:
//!
//! 1. parse the page,
//! 2. select every listing card (no cards means the listing is exhausted,
//!    even if a next link exists),
//! 3. read each field through a selector scoped to its card, leaving the
//!    field `None` when the element is missing,
//! 4. look for a next-page link through the site's fallback rules,
//! 5. resolve that link against the current page URL.

mod alibaba;
mod indiamart;

use b2bscout_core::{RawRecord, Site};
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::pagination::resolve_next_url;
use crate::text::clean_whitespace;

pub use alibaba::{AlibabaExtractor, ALIBABA_SELECTORS};
pub use indiamart::{IndiamartExtractor, INDIAMART_SELECTORS};

/// One way of locating the "next page" anchor.
#[derive(Debug, Clone, Copy)]
pub enum NextLinkRule {
    /// First element matching the CSS selector.
    Css(&'static str),
    /// First element matching `selector` whose text starts with the word
    /// `label`, e.g. `"Next"` or `"Next »"` but not `"Next-Gen Pump"`.
    Labelled {
        selector: &'static str,
        label: &'static str,
    },
}

/// CSS selectors describing one marketplace's listing markup.
///
/// Field selectors are evaluated inside a card. `product_link` and
/// `company_link` name the anchors whose `href` becomes the product and
/// company URLs.
#[derive(Debug, Clone, Copy)]
pub struct SelectorTable {
    pub card: &'static str,
    pub title: &'static str,
    pub product_link: &'static str,
    pub price: &'static str,
    pub min_order: &'static str,
    pub company: &'static str,
    pub company_link: &'static str,
    pub location: &'static str,
    /// Tried in order; the first rule that finds an element wins.
    pub next: &'static [NextLinkRule],
}

impl SelectorTable {
    /// Parses every selector in the table.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] naming the first selector
    /// that fails to parse.
    pub fn compile(&self) -> Result<CompiledSelectors, ScraperError> {
        let next = self
            .next
            .iter()
            .map(|rule| match *rule {
                NextLinkRule::Css(css) => Ok(CompiledNextRule {
                    selector: parse_selector(css)?,
                    label: None,
                }),
                NextLinkRule::Labelled { selector, label } => Ok(CompiledNextRule {
                    selector: parse_selector(selector)?,
                    label: Some(label),
                }),
            })
            .collect::<Result<Vec<_>, ScraperError>>()?;

        Ok(CompiledSelectors {
            card: parse_selector(self.card)?,
            title: parse_selector(self.title)?,
            product_link: parse_selector(self.product_link)?,
            price: parse_selector(self.price)?,
            min_order: parse_selector(self.min_order)?,
            company: parse_selector(self.company)?,
            company_link: parse_selector(self.company_link)?,
            location: parse_selector(self.location)?,
            next,
        })
    }
}

/// A [`SelectorTable`] with every selector parsed.
#[derive(Debug)]
pub struct CompiledSelectors {
    card: Selector,
    title: Selector,
    product_link: Selector,
    price: Selector,
    min_order: Selector,
    company: Selector,
    company_link: Selector,
    location: Selector,
    next: Vec<CompiledNextRule>,
}

#[derive(Debug)]
struct CompiledNextRule {
    selector: Selector,
    label: Option<&'static str>,
}

/// Records found on one page plus the resolved next-page URL, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    pub records: Vec<RawRecord>,
    pub next_url: Option<String>,
}

/// A marketplace whose listing pages can be turned into [`RawRecord`]s.
pub trait SiteExtractor: Send + Sync {
    fn site(&self) -> Site;

    fn selectors(&self) -> &CompiledSelectors;

    /// Extracts the cards on `html`, tagging each with `category`.
    /// `page_url` is the address the markup was loaded from and is used to
    /// resolve a relative next-page link.
    fn extract(&self, html: &str, page_url: &str, category: &str) -> ExtractedPage {
        extract_listing(self.site(), self.selectors(), html, page_url, category)
    }
}

/// Returns the extractor for `site`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSelector`] if the site's selector table
/// does not compile.
pub fn extractor_for(site: Site) -> Result<Box<dyn SiteExtractor>, ScraperError> {
    Ok(match site {
        Site::Indiamart => Box::new(IndiamartExtractor::new()?),
        Site::Alibaba => Box::new(AlibabaExtractor::new()?),
    })
}

/// Runs the shared extraction flow over one page of markup.
#[must_use]
pub fn extract_listing(
    site: Site,
    selectors: &CompiledSelectors,
    html: &str,
    page_url: &str,
    category: &str,
) -> ExtractedPage {
    let document = Html::parse_document(html);

    let cards: Vec<ElementRef<'_>> = document.select(&selectors.card).collect();
    if cards.is_empty() {
        return ExtractedPage::default();
    }

    let captured_at = Utc::now();
    let records = cards
        .into_iter()
        .map(|card| RawRecord {
            title: select_text(card, &selectors.title),
            price_raw: select_text(card, &selectors.price),
            min_order: select_text(card, &selectors.min_order),
            product_url: select_href(card, &selectors.product_link),
            company_name: select_text(card, &selectors.company),
            company_url: select_href(card, &selectors.company_link),
            location: select_text(card, &selectors.location),
            ..RawRecord::new(site, category, captured_at)
        })
        .collect();

    let next_url = find_next_href(&document, &selectors.next)
        .and_then(|href| resolve_next_url(page_url, href));

    ExtractedPage { records, next_url }
}

fn parse_selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::InvalidSelector {
        selector: css.to_owned(),
        reason: e.to_string(),
    })
}

/// Whitespace-cleaned text of the first match inside `scope`.
fn select_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| clean_whitespace(el.text().collect::<String>().as_str()))
}

/// `href` of the first match inside `scope`.
fn select_href(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::to_owned)
}

/// `href` of the element picked by the first matching rule. A rule that
/// matches an anchor without an `href` ends the search.
fn find_next_href<'a>(document: &'a Html, rules: &[CompiledNextRule]) -> Option<&'a str> {
    let link = rules.iter().find_map(|rule| {
        document.select(&rule.selector).find(|el| match rule.label {
            None => true,
            Some(label) => first_word_is(&el.text().collect::<String>(), label),
        })
    })?;
    link.value().attr("href")
}

fn first_word_is(text: &str, label: &str) -> bool {
    text.split_whitespace().next() == Some(label)
}

#[cfg(test)]
#[path = "../extract_test.rs"]
mod tests;
