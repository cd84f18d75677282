//! Alibaba showroom / search listings.

use b2bscout_core::Site;

use super::{CompiledSelectors, NextLinkRule, SelectorTable, SiteExtractor};
use crate::error::ScraperError;

pub const ALIBABA_SELECTORS: SelectorTable = SelectorTable {
    card: "div.organic-offer-wrapper",
    title: "h2 a.elements-title-normal__content",
    product_link: "h2 a.elements-title-normal__content",
    price: "div.price span",
    min_order: "div.quantity span",
    company: "a.supplier__name",
    company_link: "a.supplier__name",
    location: "span.supplier__region",
    next: &[
        NextLinkRule::Css(r#"a[aria-label="next"]"#),
        NextLinkRule::Css("a.next"),
    ],
};

#[derive(Debug)]
pub struct AlibabaExtractor {
    selectors: CompiledSelectors,
}

impl AlibabaExtractor {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if the selector table does
    /// not compile.
    pub fn new() -> Result<Self, ScraperError> {
        Ok(Self {
            selectors: ALIBABA_SELECTORS.compile()?,
        })
    }
}

impl SiteExtractor for AlibabaExtractor {
    fn site(&self) -> Site {
        Site::Alibaba
    }

    fn selectors(&self) -> &CompiledSelectors {
        &self.selectors
    }
}
