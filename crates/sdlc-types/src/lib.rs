//! Validated primitives shared across the SDLC artifact workspace.
//!
//! Everything here is a thin newtype that checks its invariant once, at construction, so the
//! rest of the workspace can pass values around without re-validating them.

use std::fmt;

/// Maximum length of a slug-derived document id.
const MAX_SLUG_LEN: usize = 100;

/// Document id used when a title produces an empty slug.
pub const UNTITLED_DOCUMENT_ID: &str = "untitled-document";

/// Errors that can occur when constructing validated primitives.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypeError {
    /// The input text was empty or contained only whitespace
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    /// The identifier contains characters that are not allowed
    #[error("invalid {kind}: {value:?}")]
    Invalid { kind: &'static str, value: String },
}

/// A human-facing artifact title.
///
/// Guaranteed to contain at least one non-whitespace character. Leading and trailing
/// whitespace is trimmed during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    /// Creates a new `Title`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypeError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypeError::Empty("title"));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for Title {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Title {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Title::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Stable identity shared by every version of one artifact.
///
/// Any non-empty string without surrounding whitespace or control characters is accepted, so
/// that ids minted by other clients (for example uploaded file names) stay addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    /// Validates an externally supplied document id.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::Empty`] for blank input and [`TypeError::Invalid`] when the id has
    /// surrounding whitespace or control characters.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TypeError> {
        let input = input.as_ref();
        if input.trim().is_empty() {
            return Err(TypeError::Empty("document id"));
        }
        if input.trim() != input || input.chars().any(char::is_control) {
            return Err(TypeError::Invalid {
                kind: "document id",
                value: input.to_owned(),
            });
        }
        Ok(Self(input.to_owned()))
    }

    /// Derives a document id from a title.
    ///
    /// Lowercases the title, turns whitespace runs into `-`, drops anything outside
    /// `[a-z0-9-]` and caps the result at 100 characters. Titles that leave nothing behind map
    /// to [`UNTITLED_DOCUMENT_ID`].
    pub fn slug_from_title(title: &str) -> Self {
        let mut slug = String::with_capacity(title.len());
        let mut in_whitespace = false;
        for ch in title.to_lowercase().chars() {
            if ch.is_whitespace() {
                if !in_whitespace {
                    slug.push('-');
                }
                in_whitespace = true;
                continue;
            }
            in_whitespace = false;
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
                slug.push(ch);
            }
        }
        let slug: String = slug.chars().take(MAX_SLUG_LEN).collect();

        if slug.is_empty() {
            Self(UNTITLED_DOCUMENT_ID.to_owned())
        } else {
            Self(slug)
        }
    }

    /// Returns this id with a numeric suffix, used to de-duplicate slugs.
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{n}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for DocumentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DocumentId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Identity of one persisted version row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RowId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RowId).map_err(|_| TypeError::Invalid {
            kind: "row id",
            value: s.to_owned(),
        })
    }
}

/// Identity of the workspace an artifact belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct WorkspaceId(pub u64);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for WorkspaceId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(WorkspaceId).map_err(|_| TypeError::Invalid {
            kind: "workspace id",
            value: s.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed() {
        let title = Title::new("  Project Charter \n").unwrap();
        assert_eq!(title.as_str(), "Project Charter");
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(Title::new("   "), Err(TypeError::Empty("title")));
    }

    #[test]
    fn title_deserialize_rejects_blank() {
        let result: Result<Title, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
    }

    #[test]
    fn slug_follows_title() {
        let id = DocumentId::slug_from_title("My Test Plan: v2!");
        assert_eq!(id.as_str(), "my-test-plan-v2");
    }

    #[test]
    fn slug_collapses_whitespace_runs() {
        let id = DocumentId::slug_from_title("a \t b");
        assert_eq!(id.as_str(), "a-b");
    }

    #[test]
    fn empty_slug_falls_back_to_untitled() {
        assert_eq!(DocumentId::slug_from_title("").as_str(), UNTITLED_DOCUMENT_ID);
        assert_eq!(DocumentId::slug_from_title("???").as_str(), UNTITLED_DOCUMENT_ID);
    }

    #[test]
    fn slug_is_capped() {
        let long = "x".repeat(250);
        assert_eq!(DocumentId::slug_from_title(&long).as_str().len(), 100);
    }

    #[test]
    fn document_id_parse_rejects_padding() {
        assert!(DocumentId::parse(" charter").is_err());
        assert!(DocumentId::parse("").is_err());
        assert!(DocumentId::parse("notes.txt").is_ok());
    }

    #[test]
    fn suffix_is_appended() {
        let id = DocumentId::parse("charter").unwrap();
        assert_eq!(id.with_suffix(2).as_str(), "charter-2");
    }

    #[test]
    fn numeric_ids_parse() {
        assert_eq!("42".parse::<RowId>().unwrap(), RowId(42));
        assert!("abc".parse::<WorkspaceId>().is_err());
    }
}
