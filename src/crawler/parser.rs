//! Link extraction from listing pages
//!
//! Listing levels (root, year, result pages) only contribute anchor targets;
//! structured fields are read from detail pages by the extract module.

use crate::extract::{element_text, Page};
use scraper::Selector;
use url::Url;

/// Extracts the targets of all anchors matching `selector`, in document order
///
/// Anchors without an `href`, and hrefs excluded by [`resolve_link`], are
/// skipped.
///
/// # Example
///
/// ```
/// use patent_harvester::crawler::extract_links;
/// use patent_harvester::extract::Page;
/// use scraper::Selector;
/// use url::Url;
///
/// let page = Page::parse(r#"<ul class="years"><li><a href="/2020">2020</a></li></ul>"#);
/// let selector = Selector::parse("ul.years a").unwrap();
/// let base = Url::parse("https://example.com/index").unwrap();
///
/// let links = extract_links(&page, &selector, &base);
/// assert_eq!(links[0].as_str(), "https://example.com/2020");
/// ```
pub fn extract_links(page: &Page, selector: &Selector, base_url: &Url) -> Vec<Url> {
    page.select_all(selector)
        .into_iter()
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Finds the "next page" link of a paginated listing
///
/// Returns the first anchor matching `selector` whose text contains `label`
/// (case-insensitive) and has a usable `href`.
pub fn find_next_link(page: &Page, selector: &Selector, label: &str, base_url: &Url) -> Option<Url> {
    let label = label.to_lowercase();

    page.select_all(selector)
        .into_iter()
        .filter(|element| element_text(element).to_lowercase().contains(&label))
        .filter_map(|element| element.value().attr("href"))
        .find_map(|href| resolve_link(href, base_url))
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links (same page anchors)
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => Some(absolute_url),
        _ => None,
    }
}
