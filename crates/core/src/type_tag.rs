//! Artifact type tags.
//!
//! A type tag says what kind of SDLC artifact a document is. The built-in set is closed and
//! matched exhaustively elsewhere; anything else is carried verbatim as [`TypeTag::Other`].

use std::fmt;
use std::str::FromStr;

/// Lifecycle phase a built-in type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Planning,
    Requirements,
    Design,
    Development,
    Testing,
}

macro_rules! type_tags {
    ($($variant:ident => ($tag:literal, $label:literal, $phase:ident),)+) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum TypeTag {
            $($variant,)+
            /// A tag with no built-in profile.
            Other(String),
        }

        impl TypeTag {
            /// Every built-in tag, in lifecycle order.
            pub const BUILTIN: &'static [TypeTag] = &[$(TypeTag::$variant,)+];

            pub fn as_str(&self) -> &str {
                match self {
                    $(TypeTag::$variant => $tag,)+
                    TypeTag::Other(tag) => tag,
                }
            }

            /// Human-facing name for the type.
            pub fn label(&self) -> &str {
                match self {
                    $(TypeTag::$variant => $label,)+
                    TypeTag::Other(tag) => tag,
                }
            }

            pub fn phase(&self) -> Option<Phase> {
                match self {
                    $(TypeTag::$variant => Some(Phase::$phase),)+
                    TypeTag::Other(_) => None,
                }
            }
        }

        impl From<&str> for TypeTag {
            fn from(tag: &str) -> Self {
                match tag {
                    $($tag => TypeTag::$variant,)+
                    other => TypeTag::Other(other.to_owned()),
                }
            }
        }
    };
}

type_tags! {
    BrainstormingNote => ("brainstorming_note", "Brainstorming Note", Planning),
    ProjectCharter => ("project_charter", "Project Charter", Planning),
    Roadmap => ("roadmap", "Roadmap", Planning),
    ProjectPlan => ("project_plan", "Project Plan", Planning),
    RiskAnalysis => ("risk_analysis", "Risk Analysis", Planning),
    BusinessRequirements => ("business_requirements", "Business Requirements", Requirements),
    SrsDocument => ("srs_document", "Software Requirements Specification", Requirements),
    FunctionalRequirements => ("functional_requirements", "Functional Requirements", Requirements),
    NonFunctionalRequirements => ("non_functional_requirements", "Non-Functional Requirements", Requirements),
    RequirementsTraceMatrix => ("requirements_trace_matrix", "Requirements Traceability Matrix", Requirements),
    UatDocuments => ("uat_documents", "UAT Documents", Requirements),
    BasicDesign => ("basic_design", "Basic Design", Design),
    TechnicalDesign => ("technical_design", "Technical Design", Design),
    Wireframe => ("wireframe", "Wireframe", Design),
    ScreenMap => ("screen_map", "Screen Map", Design),
    SystemDiagram => ("system_diagram", "System Diagram", Design),
    DataDesign => ("data_design", "Data Design", Design),
    DatabaseDesign => ("database_design", "Database Design", Design),
    ClassDiagram => ("class_diagram", "Class Diagram", Design),
    SequenceDiagram => ("sequence_diagram", "Sequence Diagram", Design),
    DeploymentDiagram => ("deployment_diagram", "Deployment Diagram", Design),
    ApiSpec => ("api_spec", "API Specification", Development),
    InfraDocs => ("infra_docs", "Infrastructure Docs", Development),
    UserManual => ("user_manual", "User Manual", Development),
    TestPlan => ("test_plan", "Test Plan", Testing),
    TestCases => ("test_cases", "Test Cases", Testing),
    TestResults => ("test_results", "Test Results", Testing),
    RiskRegister => ("risk_register", "Risk Register", Testing),
    DefectReport => ("defect_report", "Defect Report", Testing),
    DefectLogs => ("defect_logs", "Defect Logs", Testing),
}

impl TypeTag {
    pub fn is_builtin(&self) -> bool {
        !matches!(self, TypeTag::Other(_))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TypeTag::from(s))
    }
}

impl serde::Serialize for TypeTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for TypeTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TypeTag::from(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tags_round_trip_through_strings() {
        for tag in TypeTag::BUILTIN {
            assert_eq!(&TypeTag::from(tag.as_str()), tag);
            assert!(tag.is_builtin());
            assert!(tag.phase().is_some());
        }
    }

    #[test]
    fn test_unknown_tag_is_kept_verbatim() {
        let tag: TypeTag = "meeting_minutes".parse().unwrap();
        assert_eq!(tag, TypeTag::Other("meeting_minutes".into()));
        assert_eq!(tag.as_str(), "meeting_minutes");
        assert_eq!(tag.phase(), None);
    }

    #[test]
    fn test_serde_uses_tag_string() {
        let json = serde_json::to_string(&TypeTag::TestCases).unwrap();
        assert_eq!(json, "\"test_cases\"");
        let tag: TypeTag = serde_json::from_str("\"defect_report\"").unwrap();
        assert_eq!(tag, TypeTag::DefectReport);
    }

    #[test]
    fn test_labels() {
        assert_eq!(TypeTag::ProjectCharter.label(), "Project Charter");
        assert_eq!(TypeTag::Other("doc".into()).label(), "doc");
    }
}
