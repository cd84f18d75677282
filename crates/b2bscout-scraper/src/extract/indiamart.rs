//! IndiaMART category directory (`dir.indiamart.com/impcat/...`).

use b2bscout_core::Site;

use super::{CompiledSelectors, NextLinkRule, SelectorTable, SiteExtractor};
use crate::error::ScraperError;

// Card markup drifts; a selector that stops matching ends the crawl cleanly.
pub const INDIAMART_SELECTORS: SelectorTable = SelectorTable {
    card: "div.cl",
    title: "a.lcname",
    product_link: "a.lcname",
    price: "span.prc",
    min_order: "span.prc + span",
    company: "a.cmpny",
    company_link: "a.cmpny",
    location: "span.cty",
    next: &[
        NextLinkRule::Css(r#"a[rel="next"]"#),
        NextLinkRule::Labelled {
            selector: "a",
            label: "Next",
        },
    ],
};

#[derive(Debug)]
pub struct IndiamartExtractor {
    selectors: CompiledSelectors,
}

impl IndiamartExtractor {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if the selector table does
    /// not compile.
    pub fn new() -> Result<Self, ScraperError> {
        Ok(Self {
            selectors: INDIAMART_SELECTORS.compile()?,
        })
    }
}

impl SiteExtractor for IndiamartExtractor {
    fn site(&self) -> Site {
        Site::Indiamart
    }

    fn selectors(&self) -> &CompiledSelectors {
        &self.selectors
    }
}
