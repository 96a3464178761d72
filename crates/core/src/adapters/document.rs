//! Section-based documents and their templates.

use super::{id_field, is_blank, parse_raw, text_of, Parsed};
use crate::artifact::RawContent;
use crate::content::{DocumentContent, Section};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, PartialEq, Eq)]
pub struct SectionTemplate {
    pub id: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
}

/// Ordered sections a document type starts with.
#[derive(Debug, PartialEq, Eq)]
pub struct DocumentTemplate {
    pub sections: &'static [SectionTemplate],
    /// Also carry a `requirements` list next to the sections.
    pub carries_requirements: bool,
}

impl DocumentTemplate {
    fn skeleton(&self, overrides: &HashMap<String, String>) -> DocumentContent {
        let sections = self
            .sections
            .iter()
            .map(|t| {
                let content = overrides
                    .get(t.id)
                    .cloned()
                    .unwrap_or_else(|| t.placeholder.to_owned());
                Section::new(t.id, t.label, content)
            })
            .collect();
        DocumentContent::from_sections(sections)
    }
}

const fn section(
    id: &'static str,
    label: &'static str,
    placeholder: &'static str,
) -> SectionTemplate {
    SectionTemplate {
        id,
        label,
        placeholder,
    }
}

pub static PROJECT_CHARTER: DocumentTemplate = DocumentTemplate {
    sections: &[
        section("overview", "Overview", "Describe the project and its purpose."),
        section("vision", "Vision & Goals", "State the vision and measurable goals."),
        section("scope", "Scope", "List what is in and out of scope."),
        section("stakeholders", "Stakeholders", "Identify stakeholders and their roles."),
        section("timeline", "Timeline", "Outline key dates and milestones."),
        section("budget", "Budget", "Summarize the budget and funding."),
        section("risks", "Risks", "List the major risks."),
    ],
    carries_requirements: false,
};

pub static BUSINESS_REQUIREMENTS: DocumentTemplate = DocumentTemplate {
    sections: &[
        section("introduction", "Introduction", "Introduce the business need."),
        section("background", "Background", "Describe the current situation."),
        section("objectives", "Business Objectives", "List the business objectives."),
        section("requirements", "Business Requirements", "List the business requirements."),
        section("constraints", "Constraints", "Note known constraints."),
        section("assumptions", "Assumptions", "Note working assumptions."),
    ],
    carries_requirements: true,
};

pub static FUNCTIONAL_REQUIREMENTS: DocumentTemplate = DocumentTemplate {
    sections: &[
        section("introduction", "Introduction", "Introduce the system."),
        section("scope", "Scope", "Describe the functional scope."),
        section("userRequirements", "User Requirements", "Describe what users need to do."),
        section("systemRequirements", "System Requirements", "Describe required system behaviour."),
        section("interfaces", "Interfaces", "Describe external interfaces."),
        section("constraints", "Constraints", "Note design and implementation constraints."),
    ],
    carries_requirements: true,
};

pub static NON_FUNCTIONAL_REQUIREMENTS: DocumentTemplate = DocumentTemplate {
    sections: &[
        section("overview", "Overview", "Summarize the quality attributes."),
        section("performance", "Performance", "State response time and throughput targets."),
        section("security", "Security", "State security requirements."),
        section("usability", "Usability", "State usability requirements."),
        section("reliability", "Reliability", "State availability and recovery targets."),
        section("scalability", "Scalability", "State growth expectations."),
    ],
    carries_requirements: false,
};

pub static TECHNICAL_DESIGN: DocumentTemplate = DocumentTemplate {
    sections: &[
        section("introduction", "Introduction", "Introduce the design."),
        section("architecture", "Architecture Overview", "Describe the overall architecture."),
        section("components", "Component Design", "Describe each component."),
        section("database", "Database Design", "Describe the data model."),
        section("interfaces", "Interface Design", "Describe the interfaces between components."),
        section("security", "Security Considerations", "Describe security measures."),
        section("performance", "Performance Considerations", "Describe performance measures."),
    ],
    carries_requirements: false,
};

pub static TEST_PLAN: DocumentTemplate = DocumentTemplate {
    sections: &[
        section("introduction", "Introduction", "Introduce the test effort."),
        section("scope", "Test Scope", "Describe what will be tested."),
        section("strategy", "Test Strategy", "Describe the overall strategy."),
        section("approach", "Test Approach", "Describe the test levels and techniques."),
        section("environment", "Test Environment", "Describe the environments used."),
        section("schedule", "Test Schedule", "Outline the schedule."),
        section("resources", "Resources", "List people and tools."),
        section("risks", "Risks and Mitigations", "List risks and mitigations."),
    ],
    carries_requirements: false,
};

pub static USER_MANUAL: DocumentTemplate = DocumentTemplate {
    sections: &[
        section("introduction", "Introduction", "Introduce the product."),
        section("installation", "Installation Guide", "Explain how to install."),
        section("gettingStarted", "Getting Started", "Walk through first use."),
        section("features", "Features", "Describe the features."),
        section("howTo", "How-to Guides", "Give step-by-step guides."),
        section("troubleshooting", "Troubleshooting", "List common problems and fixes."),
        section("faq", "FAQ", "Answer frequent questions."),
    ],
    carries_requirements: false,
};

/// Normalizes document content.
///
/// Content that already has a `sections` list is kept as it is; a single value under
/// `sections` becomes the only section. Otherwise, with a template,
/// supplied values are merged over the template's placeholders; the accepted forms are a map
/// keyed by section id, a single `{id, content}` object, or a list of such objects. Free text
/// becomes one `content` section.
pub fn normalize_document(template: Option<&DocumentTemplate>, raw: &RawContent) -> DocumentContent {
    match parse_raw(raw) {
        Parsed::Text(text) => DocumentContent::from_sections(vec![Section::free_text(text)]),
        Parsed::Object(mut map) => {
            match map.remove("sections") {
                Some(Value::Array(items)) => {
                    let sections = items.iter().enumerate().map(section_from_value).collect();
                    return DocumentContent {
                        sections,
                        extra: map,
                    };
                }
                Some(Value::Null) | None => {}
                Some(other) => {
                    tracing::debug!("document sections are not a list, keeping it as one section");
                    return DocumentContent {
                        sections: vec![section_from_value((0, &other))],
                        extra: map,
                    };
                }
            }
            match template {
                Some(template) => merge_object(template, map),
                None if map.contains_key("id") && map.contains_key("content") => {
                    DocumentContent::from_sections(vec![section_from_value((0, &Value::Object(
                        map,
                    )))])
                }
                None => DocumentContent::from_sections(vec![Section::free_text(
                    Value::Object(map).to_string(),
                )]),
            }
        }
        Parsed::Array(items) => match template {
            Some(template) => {
                let mut overrides = HashMap::new();
                for item in &items {
                    if let Value::Object(obj) = item {
                        collect_single_override(obj, &mut overrides);
                    }
                }
                with_requirements(template, template.skeleton(&overrides), None)
            }
            None => DocumentContent::from_sections(
                items.iter().enumerate().map(section_from_value).collect(),
            ),
        },
    }
}

fn merge_object(template: &DocumentTemplate, map: Map<String, Value>) -> DocumentContent {
    let mut overrides = HashMap::new();
    if map.contains_key("id") && map.contains_key("content") {
        collect_single_override(&map, &mut overrides);
    } else {
        for t in template.sections {
            // Lists under a section key belong to the document, not the section text.
            let value = map
                .get(t.id)
                .filter(|v| !v.is_array() && !v.is_object() && !is_blank(Some(v)));
            if let Some(value) = value {
                overrides.insert(t.id.to_owned(), text_of(value));
            }
        }
    }
    let requirements = map.get("requirements").cloned();
    with_requirements(template, template.skeleton(&overrides), requirements)
}

fn collect_single_override(obj: &Map<String, Value>, overrides: &mut HashMap<String, String>) {
    if let Some(id) = id_field(obj, "id") {
        if !is_blank(obj.get("content")) {
            overrides.insert(id, obj.get("content").map(text_of).unwrap_or_default());
        }
    }
}

fn with_requirements(
    template: &DocumentTemplate,
    mut doc: DocumentContent,
    requirements: Option<Value>,
) -> DocumentContent {
    if template.carries_requirements {
        let list = match requirements {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        doc.extra.insert("requirements".into(), Value::Array(list));
    }
    doc
}

fn section_from_value((index, value): (usize, &Value)) -> Section {
    match value {
        Value::Object(obj) => {
            let id = id_field(obj, "id").unwrap_or_else(|| format!("section-{}", index + 1));
            let label = id_field(obj, "label")
                .or_else(|| id_field(obj, "title"))
                .unwrap_or_else(|| id.clone());
            let content = obj.get("content").map(text_of).unwrap_or_default();
            let mut extra = obj.clone();
            for key in ["id", "label", "content"] {
                extra.remove(key);
            }
            if !obj.contains_key("label") {
                extra.remove("title");
            }
            Section {
                id,
                label,
                content,
                extra,
            }
        }
        other => Section::new(
            format!("section-{}", index + 1),
            format!("Section {}", index + 1),
            text_of(other),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(doc: &DocumentContent) -> Vec<&str> {
        doc.sections.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_text_becomes_single_content_section() {
        let doc = normalize_document(Some(&PROJECT_CHARTER), &RawContent::Text("not json".into()));
        assert_eq!(doc.sections, vec![Section::new("content", "Content", "not json")]);
        assert!(doc.extra.is_empty());
    }

    #[test]
    fn test_existing_sections_are_kept() {
        let raw = RawContent::Structured(json!({
            "sections": [{"id": "custom", "label": "Custom", "content": "x", "collapsed": true}]
        }));
        let doc = normalize_document(Some(&PROJECT_CHARTER), &raw);
        assert_eq!(ids(&doc), vec!["custom"]);
        assert_eq!(doc.sections[0].extra.get("collapsed"), Some(&json!(true)));
    }

    #[test]
    fn test_non_list_sections_value_becomes_one_section() {
        let raw = RawContent::Structured(json!({"sections": "Scope is the billing module"}));
        let doc = normalize_document(Some(&PROJECT_CHARTER), &raw);
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].content, "Scope is the billing module");

        let raw = RawContent::Structured(json!({"sections": {"id": "risks", "content": "X"}}));
        let doc = normalize_document(None, &raw);
        assert_eq!(ids(&doc), vec!["risks"]);
        assert_eq!(doc.sections[0].content, "X");
    }

    #[test]
    fn test_keyed_map_merges_over_template() {
        let raw = RawContent::Structured(json!({"overview": "We build X", "budget": ""}));
        let doc = normalize_document(Some(&PROJECT_CHARTER), &raw);
        assert_eq!(
            ids(&doc),
            vec!["overview", "vision", "scope", "stakeholders", "timeline", "budget", "risks"]
        );
        assert_eq!(doc.section("overview").unwrap().content, "We build X");
        assert_eq!(doc.section("overview").unwrap().label, "Overview");
        assert_eq!(
            doc.section("budget").unwrap().content,
            "Summarize the budget and funding."
        );
    }

    #[test]
    fn test_single_section_object_merges() {
        let raw = RawContent::Structured(json!({"id": "scope", "content": "Only the API"}));
        let doc = normalize_document(Some(&PROJECT_CHARTER), &raw);
        assert_eq!(doc.sections.len(), 7);
        assert_eq!(doc.section("scope").unwrap().content, "Only the API");
    }

    #[test]
    fn test_section_list_merges() {
        let raw = RawContent::Structured(json!([
            {"id": "faq", "content": "Q and A"},
            {"id": "unknown", "content": "dropped"}
        ]));
        let doc = normalize_document(Some(&USER_MANUAL), &raw);
        assert_eq!(doc.sections.len(), 7);
        assert_eq!(doc.section("faq").unwrap().content, "Q and A");
        assert!(doc.section("unknown").is_none());
    }

    #[test]
    fn test_requirements_list_is_carried() {
        let raw = RawContent::Structured(json!({"requirements": [{"id": "BR-1"}]}));
        let doc = normalize_document(Some(&BUSINESS_REQUIREMENTS), &raw);
        assert_eq!(doc.extra.get("requirements"), Some(&json!([{"id": "BR-1"}])));

        let doc = normalize_document(Some(&FUNCTIONAL_REQUIREMENTS), &RawContent::empty_object());
        assert_eq!(doc.extra.get("requirements"), Some(&json!([])));
    }

    #[test]
    fn test_requirements_list_does_not_fill_requirements_section() {
        let raw = RawContent::Structured(json!({"requirements": ["BR-1"]}));
        let doc = normalize_document(Some(&BUSINESS_REQUIREMENTS), &raw);
        assert_eq!(
            doc.section("requirements").unwrap().content,
            "List the business requirements."
        );
    }

    #[test]
    fn test_untemplated_list_becomes_sections() {
        let raw = RawContent::Structured(json!([{"title": "Intro", "content": "hi"}, "loose"]));
        let doc = normalize_document(None, &raw);
        assert_eq!(doc.sections[0].id, "section-1");
        assert_eq!(doc.sections[0].label, "Intro");
        assert_eq!(doc.sections[1].content, "loose");
    }

    #[test]
    fn test_every_template_has_unique_section_ids() {
        for template in [
            &PROJECT_CHARTER,
            &BUSINESS_REQUIREMENTS,
            &FUNCTIONAL_REQUIREMENTS,
            &NON_FUNCTIONAL_REQUIREMENTS,
            &TECHNICAL_DESIGN,
            &TEST_PLAN,
            &USER_MANUAL,
        ] {
            let mut seen = std::collections::HashSet::new();
            assert!(template.sections.iter().all(|s| seen.insert(s.id)));
        }
    }
}
