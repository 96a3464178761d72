//! Node/edge diagrams.

use super::{id_field, is_blank, parse_raw, Parsed};
use crate::artifact::RawContent;
use crate::constants::MERMAID_FORMAT;
use crate::content::{DiagramContent, DiagramElement, DiagramGraph, DiagramKind, ExternalNotation};
use serde_json::{json, Map, Value};

/// Default for one element field.
#[derive(Debug, Clone, Copy)]
enum Fill {
    Text(&'static str),
    EmptyList,
    Origin,
}

impl Fill {
    fn value(self) -> Value {
        match self {
            Fill::Text(s) => Value::String(s.to_owned()),
            Fill::EmptyList => Value::Array(Vec::new()),
            Fill::Origin => json!({"x": 0, "y": 0}),
        }
    }

    /// Whether an existing value is unusable and must be replaced.
    fn replaces(self, current: Option<&Value>) -> bool {
        match self {
            Fill::Text("") => matches!(current, None | Some(Value::Null)),
            Fill::Text(_) => is_blank(current),
            Fill::EmptyList => !matches!(current, Some(Value::Array(_))),
            Fill::Origin => !matches!(current, Some(Value::Object(_))),
        }
    }
}

struct ElementSpec {
    id_prefix: &'static str,
    defaults: &'static [(&'static str, Fill)],
}

struct KindSpec {
    nodes: ElementSpec,
    edges: ElementSpec,
    /// Substring that marks free text as a textual notation for this kind.
    notation_marker: Option<&'static str>,
}

fn spec(kind: DiagramKind) -> KindSpec {
    match kind {
        DiagramKind::Database => KindSpec {
            nodes: ElementSpec {
                id_prefix: "entity",
                defaults: &[
                    ("name", Fill::Text("Unnamed Entity")),
                    ("attributes", Fill::EmptyList),
                    ("position", Fill::Origin),
                ],
            },
            edges: ElementSpec {
                id_prefix: "rel",
                defaults: &[
                    ("sourceCardinality", Fill::Text("1")),
                    ("targetCardinality", Fill::Text("*")),
                    ("label", Fill::Text("")),
                ],
            },
            notation_marker: Some("erDiagram"),
        },
        DiagramKind::Class => KindSpec {
            nodes: ElementSpec {
                id_prefix: "class",
                defaults: &[
                    ("name", Fill::Text("Unnamed Class")),
                    ("attributes", Fill::EmptyList),
                    ("methods", Fill::EmptyList),
                    ("position", Fill::Origin),
                ],
            },
            edges: ElementSpec {
                id_prefix: "rel",
                defaults: &[("type", Fill::Text("association")), ("label", Fill::Text(""))],
            },
            notation_marker: Some("classDiagram"),
        },
        DiagramKind::Sequence => KindSpec {
            nodes: ElementSpec {
                id_prefix: "participant",
                defaults: &[
                    ("name", Fill::Text("Unnamed Participant")),
                    ("type", Fill::Text("actor")),
                ],
            },
            edges: ElementSpec {
                id_prefix: "msg",
                defaults: &[("text", Fill::Text("")), ("type", Fill::Text("sync"))],
            },
            notation_marker: Some("sequenceDiagram"),
        },
        DiagramKind::Deployment => KindSpec {
            nodes: ElementSpec {
                id_prefix: "node",
                defaults: &[
                    ("name", Fill::Text("Unnamed Node")),
                    ("type", Fill::Text("server")),
                    ("artifacts", Fill::EmptyList),
                    ("position", Fill::Origin),
                ],
            },
            edges: ElementSpec {
                id_prefix: "conn",
                defaults: &[("label", Fill::Text("")), ("protocol", Fill::Text("HTTP"))],
            },
            notation_marker: None,
        },
        DiagramKind::Flow => KindSpec {
            nodes: ElementSpec {
                id_prefix: "node",
                defaults: &[("label", Fill::Text("")), ("position", Fill::Origin)],
            },
            edges: ElementSpec {
                id_prefix: "edge",
                defaults: &[("label", Fill::Text(""))],
            },
            notation_marker: Some("flowchart"),
        },
    }
}

/// Normalizes diagram content of one kind.
///
/// Elements get a deterministic `<prefix>-<n>` id when they have none, and every kind-specific
/// field a renderer needs is filled with its default. Free text carrying the kind's notation
/// keyword is kept as source; other text yields an empty diagram.
pub fn normalize_diagram(kind: DiagramKind, raw: &RawContent) -> DiagramContent {
    let spec = spec(kind);
    match parse_raw(raw) {
        Parsed::Text(text) => match spec.notation_marker {
            Some(marker) if text.contains(marker) => DiagramContent::External(ExternalNotation {
                kind,
                format: MERMAID_FORMAT.to_owned(),
                source: text,
            }),
            _ => DiagramContent::Graph(DiagramGraph::empty(kind)),
        },
        Parsed::Array(_) => DiagramContent::Graph(DiagramGraph::empty(kind)),
        Parsed::Object(mut map) => {
            if let (Some(Value::String(format)), Some(Value::String(source))) =
                (map.get("format"), map.get("source"))
            {
                return DiagramContent::External(ExternalNotation {
                    kind,
                    format: format.clone(),
                    source: source.clone(),
                });
            }

            let nodes = take_elements(&mut map, kind.nodes_key(), &spec.nodes);
            let edges = take_elements(&mut map, kind.edges_key(), &spec.edges);
            map.remove("type");
            DiagramContent::Graph(DiagramGraph {
                kind,
                nodes,
                edges,
                extra: map,
            })
        }
    }
}

fn take_elements(
    map: &mut Map<String, Value>,
    key: &str,
    element: &ElementSpec,
) -> Vec<DiagramElement> {
    match map.remove(key) {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| fill_element(element, i, item))
            .collect(),
        _ => Vec::new(),
    }
}

fn fill_element(element: &ElementSpec, index: usize, item: Value) -> DiagramElement {
    let mut fields = match item {
        Value::Object(obj) => obj,
        _ => Map::new(),
    };
    let id = id_field(&fields, "id")
        .unwrap_or_else(|| format!("{}-{}", element.id_prefix, index + 1));
    fields.remove("id");
    for (field, fill) in element.defaults {
        if fill.replaces(fields.get(*field)) {
            fields.insert((*field).to_owned(), fill.value());
        }
    }
    DiagramElement { id, fields }
}
