//! Next-page link resolution for listing directories.
//!
//! Listing pages link to their successor with an `href` that may be absolute,
//! root-relative (`/impcat/pumps.html?page=2`), relative (`?page=2`), or
//! unusable (`#`, `javascript:void(0)`). Anything that does not resolve to an
//! `http`/`https` URL is treated as "no next page", ending the crawl rather
//! than failing it.

use url::Url;

/// Resolves `href` against the URL of the page it was found on.
///
/// Returns `None` when the href is blank, cannot be joined, points to a
/// non-HTTP scheme, or is a same-page fragment.
#[must_use]
pub fn resolve_next_url(page_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = match Url::parse(href) {
        Ok(absolute) => absolute,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(page_url).ok()?;
            match base.join(href) {
                Ok(u) => u,
                Err(e) => {
                    tracing::debug!(page_url, href, error = %e, "unresolvable next-page href");
                    return None;
                }
            }
        }
        Err(e) => {
            tracing::debug!(page_url, href, error = %e, "malformed next-page href");
            return None;
        }
    };

    matches!(resolved.scheme(), "http" | "https").then(|| resolved.into())
}
