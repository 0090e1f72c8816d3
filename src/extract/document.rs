use crate::extract::schema::Field;
use chrono::NaiveDate;
use serde::Serialize;

/// Structured record extracted from one patent detail page
///
/// Optional text fields are either `None` or non-empty normalized text. Markup
/// fields are always present and hold an empty string when the page had no
/// matching section. Dates serialize as `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatentDocument {
    /// Upsert key: patent number, else publication number
    #[serde(skip)]
    pub id: Option<String>,

    /// Address of the detail page
    pub url: String,

    pub title: Option<String>,
    pub filed: Option<NaiveDate>,
    pub company: Option<String>,
    pub company_latest_patents: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub description: String,
    pub claims: String,
    pub citations: String,
    pub patent_number: Option<String>,
    #[serde(rename = "type")]
    pub document_type: Option<String>,
    pub publication_number: Option<String>,
    pub date_of_patent: Option<NaiveDate>,
    pub assignee: Option<String>,
    pub inventor: Option<String>,
    pub primary_examiner: Option<String>,
    pub assistant_examiner: Option<String>,
    pub application_number: Option<String>,
    pub classifications: String,
}

/// A single extracted value, shaped by how its field is stored
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Markup(String),
    Date(Option<NaiveDate>),
}

impl PatentDocument {
    /// Creates an empty document for the given page
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Stores an extracted value
    ///
    /// Schemas are checked at compile time so the value shape always matches
    /// the field; a mismatched value is ignored.
    pub fn set(&mut self, field: Field, value: FieldValue) {
        match value {
            FieldValue::Text(text) => {
                if let Some(slot) = self.text_slot(field) {
                    *slot = text;
                }
            }
            FieldValue::Markup(markup) => {
                if let Some(slot) = self.markup_slot(field) {
                    *slot = markup;
                }
            }
            FieldValue::Date(date) => match field {
                Field::Filed => self.filed = date,
                Field::DateOfPatent => self.date_of_patent = date,
                _ => {}
            },
        }
    }

    /// Resolves the upsert key from the patent or publication number
    pub fn resolve_identity(&mut self) {
        self.id = self
            .patent_number
            .clone()
            .or_else(|| self.publication_number.clone());
    }

    fn text_slot(&mut self, field: Field) -> Option<&mut Option<String>> {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Company => &mut self.company,
            Field::Abstract => &mut self.abstract_text,
            Field::PatentNumber => &mut self.patent_number,
            Field::Type => &mut self.document_type,
            Field::PublicationNumber => &mut self.publication_number,
            Field::Assignee => &mut self.assignee,
            Field::Inventor => &mut self.inventor,
            Field::PrimaryExaminer => &mut self.primary_examiner,
            Field::AssistantExaminer => &mut self.assistant_examiner,
            Field::ApplicationNumber => &mut self.application_number,
            _ => return None,
        };
        Some(slot)
    }

    fn markup_slot(&mut self, field: Field) -> Option<&mut String> {
        let slot = match field {
            Field::CompanyLatestPatents => &mut self.company_latest_patents,
            Field::Description => &mut self.description,
            Field::Claims => &mut self.claims,
            Field::Citations => &mut self.citations,
            Field::Classifications => &mut self.classifications,
            _ => return None,
        };
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_prefers_patent_number() {
        let mut doc = PatentDocument::new("https://example.com/patent/1");
        doc.patent_number = Some("10123456".to_string());
        doc.publication_number = Some("20190012345".to_string());
        doc.resolve_identity();

        assert_eq!(doc.id.as_deref(), Some("10123456"));
    }

    #[test]
    fn test_identity_missing() {
        let mut doc = PatentDocument::new("https://example.com/patent/1");
        doc.resolve_identity();
        assert_eq!(doc.id, None);
    }

    #[test]
    fn test_set_ignores_mismatched_shape() {
        let mut doc = PatentDocument::new("u");
        doc.set(Field::Title, FieldValue::Markup("<b>x</b>".to_string()));
        doc.set(Field::Claims, FieldValue::Text(Some("x".to_string())));

        assert_eq!(doc.title, None);
        assert_eq!(doc.claims, "");
    }

    #[test]
    fn test_serialized_field_names() {
        let mut doc = PatentDocument::new("https://example.com/patent/1");
        doc.id = Some("1".to_string());
        doc.abstract_text = Some("An abstract".to_string());
        doc.document_type = Some("Grant".to_string());
        doc.filed = NaiveDate::from_ymd_opt(2021, 1, 5);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["abstract"], "An abstract");
        assert_eq!(json["type"], "Grant");
        assert_eq!(json["filed"], "2021-01-05");
        assert_eq!(json["claims"], "");
        assert!(json["title"].is_null());
        assert!(json.get("id").is_none());
    }
}
