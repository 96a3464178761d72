//! Artifact rows and the payloads used to create and change them.

use crate::type_tag::TypeTag;
use chrono::{DateTime, Utc};
use sdlc_types::{DocumentId, RowId, Title, TypeError, WorkspaceId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content exactly as persisted: either a serialized string or an already-structured value.
///
/// The wire form is untagged, so a structured JSON string cannot be told apart from text once
/// stored. Stores keep content in [`RawContent::normalized`] form, where strings are always
/// `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawContent {
    Text(String),
    Structured(Value),
}

impl RawContent {
    /// An empty structured object.
    pub fn empty_object() -> Self {
        RawContent::Structured(Value::Object(Map::new()))
    }

    /// Moves a structured string into `Text`, the form it takes after a store round trip.
    pub fn normalized(self) -> Self {
        match self {
            RawContent::Structured(Value::String(text)) => RawContent::Text(text),
            other => other,
        }
    }
}

impl Default for RawContent {
    fn default() -> Self {
        RawContent::Text(String::new())
    }
}

impl From<&str> for RawContent {
    fn from(text: &str) -> Self {
        RawContent::Text(text.to_owned())
    }
}

impl From<Value> for RawContent {
    fn from(value: Value) -> Self {
        RawContent::Structured(value).normalized()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    Current,
    Archived,
}

/// One persisted version of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub row_id: RowId,
    pub document_id: DocumentId,
    pub workspace_id: WorkspaceId,
    pub type_tag: TypeTag,
    pub title: String,
    pub content: RawContent,
    #[serde(default)]
    pub references: Vec<DocumentId>,
    pub version: u32,
    #[serde(default)]
    pub parent_version: Option<u32>,
    pub status: ArtifactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStatus::Current => "current",
            ArtifactStatus::Archived => "archived",
        }
    }
}

impl std::str::FromStr for ArtifactStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(ArtifactStatus::Current),
            "archived" => Ok(ArtifactStatus::Archived),
            _ => Err(TypeError::Invalid {
                kind: "status",
                value: s.to_owned(),
            }),
        }
    }
}

impl Artifact {
    pub fn is_current(&self) -> bool {
        self.status == ArtifactStatus::Current
    }

    /// Content as searchable text: stored text verbatim, structured content as compact JSON.
    fn content_text(&self) -> String {
        match &self.content {
            RawContent::Text(text) => text.clone(),
            RawContent::Structured(value) => value.to_string(),
        }
    }
}

/// Filters for a workspace search. Unset fields match every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactQuery {
    pub type_tag: Option<TypeTag>,
    pub version: Option<u32>,
    pub status: Option<ArtifactStatus>,
    /// Case-insensitive substring of the title or the content. Blank matches everything.
    pub keyword: Option<String>,
}

impl ArtifactQuery {
    pub fn matches(&self, row: &Artifact) -> bool {
        if self.type_tag.as_ref().is_some_and(|t| *t != row.type_tag)
            || self.version.is_some_and(|v| v != row.version)
            || self.status.is_some_and(|s| s != row.status)
        {
            return false;
        }
        match self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            None => true,
            Some(keyword) => {
                let keyword = keyword.to_lowercase();
                row.title.to_lowercase().contains(&keyword)
                    || row.content_text().to_lowercase().contains(&keyword)
            }
        }
    }
}

/// An unsaved document held by a session. It has a document id but no row yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactDraft {
    pub document_id: DocumentId,
    pub type_tag: TypeTag,
    pub title: String,
    pub content: RawContent,
    pub references: Vec<DocumentId>,
}

/// Everything a store needs to insert version 1 of a new document.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtifact {
    pub document_id: DocumentId,
    pub title: Title,
    pub content: RawContent,
    pub type_tag: TypeTag,
    pub references: Vec<DocumentId>,
}

/// Full field set of a new version. Omitted fields have already been filled from the current
/// version by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionPayload {
    pub title: String,
    pub content: RawContent,
    pub type_tag: TypeTag,
    pub references: Vec<DocumentId>,
    /// Reject the write unless the current version still has this number.
    pub expected_version: Option<u32>,
}

/// In-place change to the current version. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaPayload {
    pub title: Option<String>,
    pub content: Option<RawContent>,
    pub type_tag: Option<TypeTag>,
    pub references: Option<Vec<DocumentId>>,
    pub expected_version: Option<u32>,
}

/// Caller-facing partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactPatch {
    pub title: Option<String>,
    pub content: Option<RawContent>,
    pub type_tag: Option<TypeTag>,
    pub references: Option<Vec<DocumentId>>,
}

impl ArtifactPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.type_tag.is_none()
            && self.references.is_none()
    }
}

/// A file handed to the upload operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_string_normalizes_to_text() {
        let raw = RawContent::Structured(json!("{\"tasks\": []}")).normalized();
        assert_eq!(raw, RawContent::Text("{\"tasks\": []}".into()));
        assert_eq!(RawContent::from(json!("x")), RawContent::Text("x".into()));

        let object = RawContent::Structured(json!({"a": 1}));
        assert_eq!(object.clone().normalized(), object);
    }

    #[test]
    fn test_status_parses_case_insensitively() {
        assert_eq!("Archived".parse::<ArtifactStatus>().unwrap(), ArtifactStatus::Archived);
        assert!("deleted".parse::<ArtifactStatus>().is_err());
    }

    #[test]
    fn test_blank_keyword_matches_everything() {
        let row: Artifact = serde_json::from_value(json!({
            "row_id": 1,
            "document_id": "charter",
            "workspace_id": 1,
            "type_tag": "project_charter",
            "title": "Charter",
            "content": {"sections": [{"id": "scope", "content": "Billing"}]},
            "version": 2,
            "status": "current",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let blank = ArtifactQuery {
            keyword: Some("  ".into()),
            ..Default::default()
        };
        assert!(blank.matches(&row));

        let in_content = ArtifactQuery {
            keyword: Some("billing".into()),
            version: Some(2),
            ..Default::default()
        };
        assert!(in_content.matches(&row));

        let wrong_version = ArtifactQuery {
            version: Some(1),
            ..in_content
        };
        assert!(!wrong_version.matches(&row));
    }

    #[test]
    fn test_raw_content_deserializes_strings_as_text() {
        let raw: RawContent = serde_json::from_value(json!("plain words")).unwrap();
        assert_eq!(raw, RawContent::Text("plain words".into()));

        let raw: RawContent = serde_json::from_value(json!({"sections": []})).unwrap();
        assert!(matches!(raw, RawContent::Structured(Value::Object(_))));
    }

    #[test]
    fn test_artifact_row_defaults_optional_fields() {
        let row: Artifact = serde_json::from_value(json!({
            "row_id": 3,
            "document_id": "charter",
            "workspace_id": 1,
            "type_tag": "project_charter",
            "title": "Charter",
            "content": "",
            "version": 1,
            "status": "current",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(row.references.is_empty());
        assert_eq!(row.parent_version, None);
        assert!(row.is_current());
        assert_eq!(row.type_tag, TypeTag::ProjectCharter);
    }

    #[test]
    fn test_empty_patch() {
        assert!(ArtifactPatch::default().is_empty());
        let patch = ArtifactPatch {
            title: Some("x".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
