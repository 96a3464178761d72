use sdlc_core::adapters::Adapter;
use sdlc_core::content::{CanonicalContent, DiagramContent};
use sdlc_core::{normalize, resolve, AdapterRegistry, Capability, RawContent, TypeTag};
use serde_json::{json, Value};

/// Inputs of every age and quality a stored artifact can hold.
fn samples() -> Vec<RawContent> {
    vec![
        RawContent::Text(String::new()),
        RawContent::Text("not json".into()),
        RawContent::Text("42".into()),
        RawContent::Text("{\"unterminated\": ".into()),
        RawContent::Text("sequenceDiagram\n  Alice->>Bob: hi".into()),
        RawContent::Text("[\"a\", {\"title\": \"b\"}]".into()),
        RawContent::Structured(Value::Null),
        RawContent::Structured(json!(true)),
        RawContent::Structured(json!({})),
        RawContent::Structured(json!({"id": "risks", "content": "X"})),
        RawContent::Structured(json!({"overview": "Scope is small", "extra": {"k": 1}})),
        RawContent::Structured(json!({"sections": [{"title": "Intro", "content": 3}, "loose"]})),
        RawContent::Structured(json!({"testCases": [{"title": "Login"}, {"id": 7}]})),
        RawContent::Structured(json!({"risks": [{"description": "Late vendor"}]})),
        RawContent::Structured(json!({
            "columns": [{"id": "a", "name": "A"}, "b"],
            "rows": [{"a": 1}, "free"]
        })),
        RawContent::Structured(json!({
            "entities": [{"name": ""}, {"id": 3, "position": "nowhere"}],
            "relationships": [{}],
            "participants": [{}],
            "nodes": [{"label": "n"}]
        })),
        RawContent::Structured(json!({"format": "mermaid", "source": "erDiagram"})),
        RawContent::Structured(json!({"tasks": [{"id": "t1"}], "phases": "bad", "owner": "pm"})),
        RawContent::Structured(json!([{"id": "x", "content": "y"}])),
    ]
}

fn all_tags() -> Vec<TypeTag> {
    let mut tags = TypeTag::BUILTIN.to_vec();
    tags.push(TypeTag::Other("meeting_minutes".into()));
    tags
}

#[test]
fn test_serialized_canonical_content_normalizes_to_itself() {
    for tag in all_tags() {
        for raw in samples() {
            let canonical = normalize(&tag, &raw);
            assert_eq!(
                normalize(&tag, &canonical.to_raw()),
                canonical,
                "text round trip failed for {tag} on {raw:?}"
            );
            assert_eq!(
                normalize(&tag, &RawContent::Structured(canonical.to_value())),
                canonical,
                "structured round trip failed for {tag} on {raw:?}"
            );
        }
    }
}

#[test]
fn test_freeform_adapters_are_idempotent() {
    let registry = AdapterRegistry::new();
    let tag = TypeTag::ProjectCharter;
    for capability in Capability::ALL {
        for raw in samples() {
            let once = resolve(&registry, &tag, &raw, Some(capability.as_str())).content;
            let twice = resolve(&registry, &tag, &once.to_raw(), Some(capability.as_str())).content;
            assert_eq!(once, twice, "{capability} not idempotent on {raw:?}");
            assert_eq!(once.category(), capability.category());
        }
    }
}

#[test]
fn test_charter_single_section_merge() {
    let raw = RawContent::Structured(json!({"id": "risks", "content": "X"}));
    let CanonicalContent::Document(doc) = normalize(&TypeTag::ProjectCharter, &raw) else {
        panic!("charter must normalize to a document");
    };
    let labels: Vec<(&str, &str)> = doc
        .sections
        .iter()
        .map(|s| (s.id.as_str(), s.label.as_str()))
        .collect();
    assert_eq!(
        labels,
        vec![
            ("overview", "Overview"),
            ("vision", "Vision & Goals"),
            ("scope", "Scope"),
            ("stakeholders", "Stakeholders"),
            ("timeline", "Timeline"),
            ("budget", "Budget"),
            ("risks", "Risks"),
        ]
    );
    assert_eq!(doc.section("risks").unwrap().content, "X");
    assert!(doc.sections.iter().filter(|s| s.id != "risks").all(|s| s.content != "X"));
}

#[test]
fn test_plan_scenario_fills_all_five_lists() {
    let raw = RawContent::Text(r#"{"tasks":[{"id":"t1","name":"Design"}]}"#.into());
    let value = normalize(&TypeTag::ProjectPlan, &raw).to_value();
    assert_eq!(
        value,
        json!({
            "tasks": [{"id": "t1", "name": "Design"}],
            "phases": [],
            "milestones": [],
            "resources": [],
            "risks": []
        })
    );
}

#[test]
fn test_document_scenario_wraps_unparseable_text() {
    for tag in [
        TypeTag::ProjectCharter,
        TypeTag::BrainstormingNote,
        TypeTag::Other("anything".into()),
    ] {
        let value = normalize(&tag, &RawContent::Text("not json".into())).to_value();
        assert_eq!(
            value,
            json!({"sections": [{"id": "content", "label": "Content", "content": "not json"}]}),
            "{tag}"
        );
    }
}

#[test]
fn test_unmapped_tag_resolution_fallback() {
    let registry = AdapterRegistry::new();
    let tag = TypeTag::Other("retro_notes".into());
    let raw = RawContent::Structured(json!({"went_well": ["tests"]}));

    let resolution = resolve(&registry, &tag, &raw, None);
    assert_eq!(resolution.capability, Capability::Document);
    assert_eq!(
        resolution.content,
        CanonicalContent::Generic(json!({"went_well": ["tests"]}))
    );
    assert_eq!(registry.profile(&tag).adapter, Adapter::Identity);
}

#[test]
fn test_sequence_text_becomes_external_notation() {
    let text = "sequenceDiagram\n  Alice->>Bob: hi";
    let canonical = normalize(&TypeTag::SequenceDiagram, &RawContent::Text(text.into()));
    assert!(matches!(
        canonical,
        CanonicalContent::Diagram(DiagramContent::External(_))
    ));
    assert_eq!(
        canonical.to_value(),
        json!({"type": "sequence", "format": "mermaid", "source": text})
    );
}

#[test]
fn test_normalization_is_deterministic() {
    for tag in all_tags() {
        for raw in samples() {
            assert_eq!(normalize(&tag, &raw), normalize(&tag, &raw));
        }
    }
}
