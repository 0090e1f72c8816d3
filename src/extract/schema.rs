//! Extraction schema: which element feeds which document field

use crate::extract::page::Page;
use crate::{ConfigError, ConfigResult};
use scraper::{ElementRef, Selector};
use serde::Deserialize;
use std::collections::HashSet;

/// Output fields of a [`PatentDocument`](crate::extract::PatentDocument)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Filed,
    Company,
    CompanyLatestPatents,
    Abstract,
    Description,
    Claims,
    Citations,
    PatentNumber,
    Type,
    PublicationNumber,
    DateOfPatent,
    Assignee,
    Inventor,
    PrimaryExaminer,
    AssistantExaminer,
    ApplicationNumber,
    Classifications,
}

/// How a field is stored in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Text,
    Markup,
    Date,
}

impl Field {
    pub fn storage(&self) -> Storage {
        match self {
            Self::Filed | Self::DateOfPatent => Storage::Date,
            Self::CompanyLatestPatents
            | Self::Description
            | Self::Claims
            | Self::Citations
            | Self::Classifications => Storage::Markup,
            _ => Storage::Text,
        }
    }
}

/// How matched elements are turned into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// Text of the first match
    Text,
    /// Texts of all matches joined with a space
    JoinedText,
    /// Outer HTML of all matches joined with a space; empty when nothing matched
    Markup,
    /// Text of the first match parsed as `Mon D, YYYY`
    Date,
}

impl FieldKind {
    pub fn storage(&self) -> Storage {
        match self {
            Self::Text | Self::JoinedText => Storage::Text,
            Self::Markup => Storage::Markup,
            Self::Date => Storage::Date,
        }
    }
}

fn default_sibling() -> String {
    "*".to_string()
}

/// Where the elements for a field are found
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Locator {
    /// Elements matching a CSS selector
    Css { css: String },

    /// Sibling elements following a `<strong>` label containing `label`;
    /// `sibling` filters them by tag name, `*` keeps every element
    Label {
        label: String,
        #[serde(default = "default_sibling")]
        sibling: String,
    },
}

impl Locator {
    pub fn css(selector: &str) -> Self {
        Self::Css {
            css: selector.to_string(),
        }
    }

    pub fn label(label: &str, sibling: &str) -> Self {
        Self::Label {
            label: label.to_string(),
            sibling: sibling.to_string(),
        }
    }
}

/// A single extraction rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldRule {
    pub field: Field,
    #[serde(flatten)]
    pub locator: Locator,
    pub kind: FieldKind,
}

impl FieldRule {
    pub fn new(field: Field, locator: Locator, kind: FieldKind) -> Self {
        Self {
            field,
            locator,
            kind,
        }
    }
}

/// An ordered set of extraction rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Rules for patents.justia.com detail pages
    ///
    /// Granted patents and published applications share this layout; fields
    /// present on only one of them simply come out empty on the other.
    pub fn patents() -> Self {
        use Field::*;
        use FieldKind as K;

        Self::new(vec![
            FieldRule::new(Title, Locator::css("h1.heading-1"), K::Text),
            FieldRule::new(Filed, Locator::css("#byline time"), K::Date),
            FieldRule::new(Company, Locator::css("#byline time + a"), K::Text),
            FieldRule::new(
                CompanyLatestPatents,
                Locator::css("#company-latest .wrap:not(.title-wrapper)"),
                K::Markup,
            ),
            FieldRule::new(Abstract, Locator::css("#abstract p"), K::Text),
            FieldRule::new(Description, Locator::css("#description"), K::Markup),
            FieldRule::new(Claims, Locator::css("#claims .wrap"), K::Markup),
            FieldRule::new(Citations, Locator::css("#citations .wrap"), K::Markup),
            FieldRule::new(PatentNumber, Locator::label("Patent number", "*"), K::Text),
            FieldRule::new(Type, Locator::label("Type", "*"), K::Text),
            FieldRule::new(
                PublicationNumber,
                Locator::label("Publication number", "*"),
                K::Text,
            ),
            FieldRule::new(DateOfPatent, Locator::label("Date of Patent", "*"), K::Date),
            FieldRule::new(Assignee, Locator::label("Assignee", "a"), K::JoinedText),
            FieldRule::new(Inventor, Locator::label("Inventor", "a"), K::JoinedText),
            FieldRule::new(
                PrimaryExaminer,
                Locator::label("Primary Examiner", "a"),
                K::Text,
            ),
            FieldRule::new(
                AssistantExaminer,
                Locator::label("Assistant Examiner", "a"),
                K::Text,
            ),
            FieldRule::new(
                ApplicationNumber,
                Locator::label("Application Number", "*"),
                K::Text,
            ),
            FieldRule::new(
                Classifications,
                Locator::css("#classifications .wrap"),
                K::Markup,
            ),
        ])
    }

    /// Validates the rules and compiles their selectors
    ///
    /// # Returns
    ///
    /// * `Ok(CompiledSchema)` - Every rule is usable
    /// * `Err(ConfigError)` - A selector failed to parse, a field appears twice,
    ///   a label is empty, or a rule's kind cannot be stored in its field
    pub fn compile(&self) -> ConfigResult<CompiledSchema> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            if !seen.insert(rule.field) {
                return Err(ConfigError::Validation(format!(
                    "Field {:?} is extracted by more than one rule",
                    rule.field
                )));
            }

            if rule.field.storage() != rule.kind.storage() {
                return Err(ConfigError::Validation(format!(
                    "Field {:?} cannot be extracted as {:?}",
                    rule.field, rule.kind
                )));
            }

            let locator = match &rule.locator {
                Locator::Css { css } => CompiledLocator::Css(compile_selector(css)?),
                Locator::Label { label, sibling } => {
                    if label.trim().is_empty() {
                        return Err(ConfigError::Validation(format!(
                            "Field {:?} has an empty label",
                            rule.field
                        )));
                    }

                    let tag = match sibling.trim() {
                        "" | "*" => None,
                        tag => Some(tag.to_string()),
                    };

                    CompiledLocator::Label {
                        anchor: compile_selector("strong")?,
                        label: label.clone(),
                        tag,
                    }
                }
            };

            rules.push(CompiledRule {
                field: rule.field,
                kind: rule.kind,
                locator,
            });
        }

        Ok(CompiledSchema { rules })
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::patents()
    }
}

/// Parses a CSS selector, mapping failures to a configuration error
pub fn compile_selector(css: &str) -> ConfigResult<Selector> {
    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

enum CompiledLocator {
    Css(Selector),
    Label {
        anchor: Selector,
        label: String,
        tag: Option<String>,
    },
}

/// A rule whose selectors are ready to run
pub struct CompiledRule {
    pub field: Field,
    pub kind: FieldKind,
    locator: CompiledLocator,
}

impl CompiledRule {
    /// Finds the elements this rule reads from, in document order
    pub fn locate<'a>(&self, page: &'a Page) -> Vec<ElementRef<'a>> {
        match &self.locator {
            CompiledLocator::Css(selector) => page.select_all(selector),
            CompiledLocator::Label { anchor, label, tag } => {
                page.select_labelled(anchor, label, tag.as_deref())
            }
        }
    }
}

/// A validated schema ready for extraction
pub struct CompiledSchema {
    rules: Vec<CompiledRule>,
}

impl CompiledSchema {
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }
}
