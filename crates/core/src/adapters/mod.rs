//! Content adapters.
//!
//! An adapter turns raw content of any age into one canonical shape. Adapters are total: they
//! never fail, and content that cannot be read is wrapped or replaced with a skeleton rather
//! than rejected.

pub mod diagram;
pub mod document;
pub mod plan;
pub mod table;

use crate::artifact::RawContent;
use crate::content::{CanonicalContent, Category, DiagramKind, DocumentContent, Section};
use serde_json::{Map, Value};

pub use diagram::normalize_diagram;
pub use document::{normalize_document, DocumentTemplate, SectionTemplate};
pub use plan::normalize_plan;
pub use table::{normalize_table, ColumnTemplate, TableTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    /// Sections, merged against a template when one is given.
    Document(Option<&'static DocumentTemplate>),
    Table(&'static TableTemplate),
    Diagram(DiagramKind),
    Plan,
    /// Returns structured content unchanged and wraps free text as a document.
    Identity,
}

impl Adapter {
    /// Adapter used when a capability from another category is chosen for a type.
    pub fn freeform(category: Category) -> Adapter {
        match category {
            Category::Document => Adapter::Document(None),
            Category::Table => Adapter::Table(&table::FREEFORM_TABLE),
            Category::Diagram => Adapter::Diagram(DiagramKind::Flow),
            Category::Plan => Adapter::Plan,
            Category::Generic => Adapter::Identity,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Adapter::Document(_) => Category::Document,
            Adapter::Table(_) => Category::Table,
            Adapter::Diagram(_) => Category::Diagram,
            Adapter::Plan => Category::Plan,
            Adapter::Identity => Category::Generic,
        }
    }

    pub fn apply(&self, raw: &RawContent) -> CanonicalContent {
        match self {
            Adapter::Document(template) => {
                CanonicalContent::Document(normalize_document(*template, raw))
            }
            Adapter::Table(template) => CanonicalContent::Table(normalize_table(template, raw)),
            Adapter::Diagram(kind) => CanonicalContent::Diagram(normalize_diagram(*kind, raw)),
            Adapter::Plan => CanonicalContent::Plan(normalize_plan(raw)),
            Adapter::Identity => identity(raw),
        }
    }
}

fn identity(raw: &RawContent) -> CanonicalContent {
    match parse_raw(raw) {
        Parsed::Object(map) if matches!(map.get("sections"), Some(Value::Array(_))) => {
            CanonicalContent::Document(normalize_document(None, raw))
        }
        Parsed::Object(map) => CanonicalContent::Generic(Value::Object(map)),
        Parsed::Array(items) => CanonicalContent::Generic(Value::Array(items)),
        Parsed::Text(text) => {
            CanonicalContent::Document(DocumentContent::from_sections(vec![Section::free_text(
                text,
            )]))
        }
    }
}

/// Raw content after the one parse attempt every adapter makes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Parsed {
    Object(Map<String, Value>),
    Array(Vec<Value>),
    /// Anything that is not a JSON object or array, as text.
    Text(String),
}

pub(crate) fn parse_raw(raw: &RawContent) -> Parsed {
    match raw {
        RawContent::Text(text) | RawContent::Structured(Value::String(text)) => {
            match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => Parsed::Object(map),
                Ok(Value::Array(items)) => Parsed::Array(items),
                Ok(_) => Parsed::Text(text.clone()),
                Err(err) => {
                    if !text.trim().is_empty() {
                        tracing::debug!("content is not JSON, treating as text: {err}");
                    }
                    Parsed::Text(text.clone())
                }
            }
        }
        RawContent::Structured(Value::Object(map)) => Parsed::Object(map.clone()),
        RawContent::Structured(Value::Array(items)) => Parsed::Array(items.clone()),
        RawContent::Structured(other) => Parsed::Text(text_of(other)),
    }
}

/// Renders a value as display text. Strings are taken verbatim, `null` becomes empty.
pub(crate) fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Reads an identifier-like field, accepting strings and numbers.
pub(crate) fn id_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// True when a field is missing or carries no usable value.
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}
