//! Parsed HTML page with CSS and label-based element lookup

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document
///
/// `scraper::Html` is not `Send`, so a `Page` must be built, queried and
/// dropped without crossing an `.await`.
pub struct Page {
    document: Html,
}

impl Page {
    /// Parses an HTML document
    ///
    /// Parsing is lenient: malformed markup still yields a (possibly empty)
    /// document tree, so this never fails.
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Returns the first element matching `selector`
    pub fn select_one(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.document.select(selector).next()
    }

    /// Returns all elements matching `selector`, in document order
    pub fn select_all(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        self.document.select(selector).collect()
    }

    /// Returns the sibling elements that follow a label
    ///
    /// A label is any element matching `anchor` (usually `<strong>`) whose text
    /// contains `label`. Every element after it under the same parent is
    /// returned, optionally filtered by tag name. Elements reachable from more
    /// than one label are returned once.
    ///
    /// # Example
    ///
    /// ```
    /// use patent_harvester::extract::{element_text, Page};
    /// use scraper::Selector;
    ///
    /// let page = Page::parse("<div><strong>Inventor:</strong> <a>Ada</a> <a>Bob</a></div>");
    /// let anchor = Selector::parse("strong").unwrap();
    /// let found = page.select_labelled(&anchor, "Inventor", Some("a"));
    /// assert_eq!(found.len(), 2);
    /// assert_eq!(element_text(&found[1]), "Bob");
    /// ```
    pub fn select_labelled(
        &self,
        anchor: &Selector,
        label: &str,
        tag: Option<&str>,
    ) -> Vec<ElementRef<'_>> {
        let mut found: Vec<ElementRef<'_>> = Vec::new();

        for candidate in self.document.select(anchor) {
            if !candidate.text().collect::<String>().contains(label) {
                continue;
            }

            for sibling in candidate.next_siblings().filter_map(ElementRef::wrap) {
                let tag_matches =
                    tag.map_or(true, |t| sibling.value().name().eq_ignore_ascii_case(t));

                if tag_matches && !found.iter().any(|e| e.id() == sibling.id()) {
                    found.push(sibling);
                }
            }
        }

        found
    }
}

/// Returns the visible text of an element
///
/// Each text node is trimmed and the non-empty pieces are joined with a single
/// space, so `<b>Foo</b><i>Bar</i>` reads `Foo Bar`.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the outer HTML of an element
pub fn element_markup(element: &ElementRef<'_>) -> String {
    element.html()
}
