//! Builds a [`PatentDocument`] from a parsed detail page

use crate::extract::date::parse_page_date;
use crate::extract::document::{FieldValue, PatentDocument};
use crate::extract::page::{element_markup, element_text, Page};
use crate::extract::schema::{CompiledRule, CompiledSchema, FieldKind};
use crate::normalize::{normalize_fragment_list, normalize_line, strip_label_punctuation};

/// Extracts a document from a detail page
///
/// Extraction never fails. A rule whose elements are missing leaves its field
/// `None` (or empty for markup fields), and a date that does not parse leaves
/// its field `None` without affecting the other fields.
///
/// # Arguments
///
/// * `page` - The parsed detail page
/// * `schema` - The compiled extraction rules
/// * `url` - The address the page was fetched from
///
/// # Example
///
/// ```
/// use patent_harvester::extract::{extract, Page, Schema};
///
/// let schema = Schema::patents().compile().unwrap();
/// let page = Page::parse(
///     "<h1 class=\"heading-1\">Widget</h1>\
///      <div><strong>Publication number:</strong> <span>20210001234</span></div>",
/// );
///
/// let doc = extract(&page, &schema, "https://example.com/patent/20210001234");
/// assert_eq!(doc.title.as_deref(), Some("Widget"));
/// assert_eq!(doc.id.as_deref(), Some("20210001234"));
/// ```
pub fn extract(page: &Page, schema: &CompiledSchema, url: &str) -> PatentDocument {
    let mut document = PatentDocument::new(url);

    for rule in schema.rules() {
        let value = extract_value(page, rule, url);
        document.set(rule.field, value);
    }

    document.resolve_identity();
    document
}

fn extract_value(page: &Page, rule: &CompiledRule, url: &str) -> FieldValue {
    let elements = rule.locate(page);

    match rule.kind {
        FieldKind::Text => {
            FieldValue::Text(elements.first().and_then(|el| clean_text(&element_text(el))))
        }

        FieldKind::JoinedText => {
            let joined = elements
                .iter()
                .map(element_text)
                .collect::<Vec<_>>()
                .join(" ");
            FieldValue::Text(clean_text(&joined))
        }

        FieldKind::Markup => {
            let fragments: Vec<String> = elements.iter().map(element_markup).collect();
            FieldValue::Markup(normalize_fragment_list(&fragments))
        }

        FieldKind::Date => {
            let raw = elements.first().and_then(|el| clean_text(&element_text(el)));
            let date = raw.and_then(|text| match parse_page_date(&text) {
                Ok(date) => Some(date),
                Err(e) => {
                    tracing::debug!(
                        "Unparseable {:?} date '{}' on {}: {}",
                        rule.field,
                        text,
                        url,
                        e
                    );
                    None
                }
            });
            FieldValue::Date(date)
        }
    }
}

/// Label punctuation can land inside the value element, so it is stripped
/// from every text-shaped value before normalizing
fn clean_text(text: &str) -> Option<String> {
    normalize_line(&strip_label_punctuation(text))
}
