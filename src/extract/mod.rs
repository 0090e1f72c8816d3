//! Field extraction from patent detail pages
//!
//! This module turns a fetched detail page into a [`PatentDocument`]:
//! - `Page` wraps the parsed HTML and answers CSS and label lookups
//! - `Schema` lists which elements feed which field and how
//! - `extract` applies a compiled schema to a page
//!
//! Extraction performs no I/O and never fails; absent page structure degrades
//! to empty fields because granted patents and published applications use
//! different templates.

mod date;
mod document;
mod extractor;
mod page;
mod schema;

pub use date::{parse_page_date, PAGE_DATE_FORMAT};
pub use document::{FieldValue, PatentDocument};
pub use extractor::extract;
pub use page::{element_markup, element_text, Page};
pub use schema::{
    compile_selector, CompiledRule, CompiledSchema, Field, FieldKind, FieldRule, Locator, Schema,
    Storage,
};
