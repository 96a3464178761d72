//! Canonical content shapes.
//!
//! Every adapter produces one of these. The shapes are deliberately loose: known fields are
//! typed, anything else a caller stored next to them is kept in an `extra` map so normalizing
//! never throws data away.

use crate::artifact::RawContent;
use crate::constants::{CONTENT_SECTION_ID, CONTENT_SECTION_LABEL};
use serde_json::{Map, Value};

/// Shape family a piece of canonical content belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Document,
    Table,
    Diagram,
    Plan,
    /// Pass-through content for types with no registered shape.
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub label: String,
    pub content: String,
    pub extra: Map<String, Value>,
}

impl Section {
    pub fn new(id: impl Into<String>, label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            content: content.into(),
            extra: Map::new(),
        }
    }

    /// The single section free text is wrapped into.
    pub fn free_text(text: impl Into<String>) -> Self {
        Self::new(CONTENT_SECTION_ID, CONTENT_SECTION_LABEL, text)
    }

    fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert("label".into(), Value::String(self.label.clone()));
        map.insert("content".into(), Value::String(self.content.clone()));
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContent {
    pub sections: Vec<Section>,
    pub extra: Map<String, Value>,
}

impl DocumentContent {
    pub fn from_sections(sections: Vec<Section>) -> Self {
        Self {
            sections,
            extra: Map::new(),
        }
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub field: String,
    pub header_name: String,
    pub column_type: Option<String>,
    /// Presentation hints such as `width` or `flex`.
    pub extra: Map<String, Value>,
}

impl Column {
    fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert("field".into(), Value::String(self.field.clone()));
        map.insert("headerName".into(), Value::String(self.header_name.clone()));
        if let Some(column_type) = &self.column_type {
            map.insert("type".into(), Value::String(column_type.clone()));
        }
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Row {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("id".into(), Value::String(self.id.clone()));
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableContent {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    Database,
    Class,
    Sequence,
    Deployment,
    /// Plain node/edge graph used when no specific notation applies.
    Flow,
}

impl DiagramKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramKind::Database => "database",
            DiagramKind::Class => "class",
            DiagramKind::Sequence => "sequence",
            DiagramKind::Deployment => "deployment",
            DiagramKind::Flow => "flow",
        }
    }

    /// Key holding the node list in the serialized form.
    pub fn nodes_key(&self) -> &'static str {
        match self {
            DiagramKind::Database => "entities",
            DiagramKind::Class => "classes",
            DiagramKind::Sequence => "participants",
            DiagramKind::Deployment | DiagramKind::Flow => "nodes",
        }
    }

    /// Key holding the edge list in the serialized form.
    pub fn edges_key(&self) -> &'static str {
        match self {
            DiagramKind::Database | DiagramKind::Class => "relationships",
            DiagramKind::Sequence => "messages",
            DiagramKind::Deployment => "connections",
            DiagramKind::Flow => "edges",
        }
    }
}

/// A node or edge. `fields` holds everything except the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramElement {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl DiagramElement {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("id".into(), Value::String(self.id.clone()));
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramGraph {
    pub kind: DiagramKind,
    pub nodes: Vec<DiagramElement>,
    pub edges: Vec<DiagramElement>,
    pub extra: Map<String, Value>,
}

impl DiagramGraph {
    pub fn empty(kind: DiagramKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            edges: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Diagram source kept in a textual notation instead of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalNotation {
    pub kind: DiagramKind,
    pub format: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramContent {
    Graph(DiagramGraph),
    External(ExternalNotation),
}

impl DiagramContent {
    pub fn kind(&self) -> DiagramKind {
        match self {
            DiagramContent::Graph(g) => g.kind,
            DiagramContent::External(e) => e.kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanContent {
    pub tasks: Vec<Value>,
    pub phases: Vec<Value>,
    pub milestones: Vec<Value>,
    pub resources: Vec<Value>,
    pub risks: Vec<Value>,
    pub extra: Map<String, Value>,
}

/// Field names of the plan lists, in serialized order.
pub const PLAN_LIST_KEYS: [&str; 5] = ["tasks", "phases", "milestones", "resources", "risks"];

impl PlanContent {
    pub(crate) fn list_mut(&mut self, key: &str) -> Option<&mut Vec<Value>> {
        match key {
            "tasks" => Some(&mut self.tasks),
            "phases" => Some(&mut self.phases),
            "milestones" => Some(&mut self.milestones),
            "resources" => Some(&mut self.resources),
            "risks" => Some(&mut self.risks),
            _ => None,
        }
    }

    fn lists(&self) -> [(&'static str, &Vec<Value>); 5] {
        [
            ("tasks", &self.tasks),
            ("phases", &self.phases),
            ("milestones", &self.milestones),
            ("resources", &self.resources),
            ("risks", &self.risks),
        ]
    }
}

/// Normalized content, tagged by its shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalContent {
    Document(DocumentContent),
    Table(TableContent),
    Diagram(DiagramContent),
    Plan(PlanContent),
    Generic(Value),
}

impl CanonicalContent {
    pub fn category(&self) -> Category {
        match self {
            CanonicalContent::Document(_) => Category::Document,
            CanonicalContent::Table(_) => Category::Table,
            CanonicalContent::Diagram(_) => Category::Diagram,
            CanonicalContent::Plan(_) => Category::Plan,
            CanonicalContent::Generic(_) => Category::Generic,
        }
    }

    /// Structured form, as stored and as handed to display capabilities.
    pub fn to_value(&self) -> Value {
        match self {
            CanonicalContent::Document(doc) => {
                let mut map = doc.extra.clone();
                map.insert(
                    "sections".into(),
                    Value::Array(doc.sections.iter().map(Section::to_value).collect()),
                );
                Value::Object(map)
            }
            CanonicalContent::Table(table) => {
                let mut map = table.extra.clone();
                map.insert(
                    "columns".into(),
                    Value::Array(table.columns.iter().map(Column::to_value).collect()),
                );
                map.insert(
                    "rows".into(),
                    Value::Array(table.rows.iter().map(Row::to_value).collect()),
                );
                Value::Object(map)
            }
            CanonicalContent::Diagram(DiagramContent::Graph(graph)) => {
                let mut map = graph.extra.clone();
                map.insert("type".into(), Value::String(graph.kind.as_str().into()));
                map.insert(
                    graph.kind.nodes_key().into(),
                    Value::Array(graph.nodes.iter().map(DiagramElement::to_value).collect()),
                );
                map.insert(
                    graph.kind.edges_key().into(),
                    Value::Array(graph.edges.iter().map(DiagramElement::to_value).collect()),
                );
                Value::Object(map)
            }
            CanonicalContent::Diagram(DiagramContent::External(ext)) => {
                let mut map = Map::new();
                map.insert("type".into(), Value::String(ext.kind.as_str().into()));
                map.insert("format".into(), Value::String(ext.format.clone()));
                map.insert("source".into(), Value::String(ext.source.clone()));
                Value::Object(map)
            }
            CanonicalContent::Plan(plan) => {
                let mut map = plan.extra.clone();
                for (key, list) in plan.lists() {
                    map.insert(key.into(), Value::Array(list.clone()));
                }
                Value::Object(map)
            }
            CanonicalContent::Generic(value) => value.clone(),
        }
    }

    /// Serialized form suitable for persisting back into a row.
    pub fn to_raw(&self) -> RawContent {
        RawContent::Text(self.to_value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_value_keeps_extra_keys() {
        let mut doc = DocumentContent::from_sections(vec![Section::free_text("hi")]);
        doc.extra.insert("requirements".into(), json!([]));
        let value = CanonicalContent::Document(doc).to_value();
        assert_eq!(
            value,
            json!({
                "sections": [{"id": "content", "label": "Content", "content": "hi"}],
                "requirements": []
            })
        );
    }

    #[test]
    fn test_graph_uses_kind_specific_keys() {
        let graph = DiagramGraph::empty(DiagramKind::Sequence);
        let value = CanonicalContent::Diagram(DiagramContent::Graph(graph)).to_value();
        assert_eq!(
            value,
            json!({"type": "sequence", "participants": [], "messages": []})
        );
    }

    #[test]
    fn test_empty_plan_has_every_list() {
        let value = CanonicalContent::Plan(PlanContent::default()).to_value();
        for key in PLAN_LIST_KEYS {
            assert_eq!(value[key], json!([]));
        }
    }

    #[test]
    fn test_to_raw_is_json_text() {
        let raw = CanonicalContent::Generic(json!({"a": 1})).to_raw();
        assert_eq!(raw, RawContent::Text("{\"a\":1}".into()));
    }
}
