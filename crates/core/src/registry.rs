//! Type profiles: which adapter normalizes a type and which capabilities can display it.

use crate::adapters::{document, table, Adapter};
use crate::artifact::RawContent;
use crate::content::{CanonicalContent, Category, DiagramKind};
use crate::type_tag::TypeTag;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A rendering capability able to display and edit one content shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Document,
    Table,
    Diagram,
    Gantt,
    Kanban,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Document,
        Capability::Table,
        Capability::Diagram,
        Capability::Gantt,
        Capability::Kanban,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Document => "document",
            Capability::Table => "table",
            Capability::Diagram => "diagram",
            Capability::Gantt => "gantt",
            Capability::Kanban => "kanban",
        }
    }

    /// Shape the capability consumes.
    pub fn category(&self) -> Category {
        match self {
            Capability::Document => Category::Document,
            Capability::Table | Capability::Kanban => Category::Table,
            Capability::Diagram => Category::Diagram,
            Capability::Gantt => Category::Plan,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability: {0:?}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCapability(s.to_owned()))
    }
}

/// How one type is normalized and displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeProfile {
    pub adapter: Adapter,
    /// Available capabilities, default first. Never empty.
    capabilities: Vec<Capability>,
}

impl TypeProfile {
    pub fn new(adapter: Adapter, default: Capability, alternatives: &[Capability]) -> Self {
        let mut capabilities = vec![default];
        capabilities.extend(alternatives.iter().copied().filter(|c| *c != default));
        Self {
            adapter,
            capabilities,
        }
    }

    pub fn default_capability(&self) -> Capability {
        self.capabilities[0]
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }
}

/// Built-in profile for a tag. `Other` tags get the pass-through fallback.
pub fn builtin_profile(tag: &TypeTag) -> TypeProfile {
    use Capability::{Diagram, Document, Gantt, Kanban, Table};

    match tag {
        TypeTag::BrainstormingNote | TypeTag::SrsDocument | TypeTag::InfraDocs => {
            TypeProfile::new(Adapter::Document(None), Document, &[])
        }
        TypeTag::RiskAnalysis | TypeTag::UatDocuments | TypeTag::ApiSpec => {
            TypeProfile::new(Adapter::Document(None), Document, &[Table])
        }
        TypeTag::ProjectCharter => TypeProfile::new(
            Adapter::Document(Some(&document::PROJECT_CHARTER)),
            Document,
            &[Table],
        ),
        TypeTag::BusinessRequirements => TypeProfile::new(
            Adapter::Document(Some(&document::BUSINESS_REQUIREMENTS)),
            Document,
            &[Table],
        ),
        TypeTag::FunctionalRequirements => TypeProfile::new(
            Adapter::Document(Some(&document::FUNCTIONAL_REQUIREMENTS)),
            Document,
            &[Table],
        ),
        TypeTag::NonFunctionalRequirements => TypeProfile::new(
            Adapter::Document(Some(&document::NON_FUNCTIONAL_REQUIREMENTS)),
            Document,
            &[Table],
        ),
        TypeTag::BasicDesign => TypeProfile::new(Adapter::Document(None), Document, &[Diagram]),
        TypeTag::TechnicalDesign => TypeProfile::new(
            Adapter::Document(Some(&document::TECHNICAL_DESIGN)),
            Document,
            &[Diagram],
        ),
        TypeTag::UserManual => {
            TypeProfile::new(Adapter::Document(Some(&document::USER_MANUAL)), Document, &[])
        }
        TypeTag::TestPlan => {
            TypeProfile::new(Adapter::Document(Some(&document::TEST_PLAN)), Document, &[Table])
        }
        TypeTag::Roadmap | TypeTag::ProjectPlan => {
            TypeProfile::new(Adapter::Plan, Gantt, &[Table])
        }
        TypeTag::RequirementsTraceMatrix => {
            TypeProfile::new(Adapter::Table(&table::TRACE_MATRIX), Table, &[])
        }
        TypeTag::TestCases => {
            TypeProfile::new(Adapter::Table(&table::TEST_CASES), Table, &[Kanban])
        }
        TypeTag::TestResults => {
            TypeProfile::new(Adapter::Table(&table::TEST_RESULTS), Table, &[])
        }
        TypeTag::RiskRegister => {
            TypeProfile::new(Adapter::Table(&table::RISK_REGISTER), Table, &[Kanban])
        }
        TypeTag::DefectReport | TypeTag::DefectLogs => {
            TypeProfile::new(Adapter::Table(&table::DEFECTS), Table, &[Kanban])
        }
        TypeTag::Wireframe | TypeTag::ScreenMap => {
            TypeProfile::new(Adapter::Diagram(DiagramKind::Flow), Diagram, &[])
        }
        TypeTag::SystemDiagram | TypeTag::DeploymentDiagram => {
            TypeProfile::new(Adapter::Diagram(DiagramKind::Deployment), Diagram, &[Table])
        }
        TypeTag::DataDesign | TypeTag::DatabaseDesign => {
            TypeProfile::new(Adapter::Diagram(DiagramKind::Database), Diagram, &[Table])
        }
        TypeTag::ClassDiagram => {
            TypeProfile::new(Adapter::Diagram(DiagramKind::Class), Diagram, &[])
        }
        TypeTag::SequenceDiagram => {
            TypeProfile::new(Adapter::Diagram(DiagramKind::Sequence), Diagram, &[])
        }
        TypeTag::Other(_) => TypeProfile::new(Adapter::Identity, Document, &[]),
    }
}

/// Built-in profiles plus any registered at runtime.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    overrides: HashMap<TypeTag, TypeProfile>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile for a tag, replacing the built-in one.
    pub fn register(&mut self, tag: TypeTag, profile: TypeProfile) {
        tracing::debug!("registered adapter for {tag}: {:?}", profile.adapter);
        self.overrides.insert(tag, profile);
    }

    pub fn profile(&self, tag: &TypeTag) -> TypeProfile {
        self.overrides
            .get(tag)
            .cloned()
            .unwrap_or_else(|| builtin_profile(tag))
    }

    /// Normalizes raw content with the tag's own adapter.
    pub fn normalize(&self, tag: &TypeTag, raw: &RawContent) -> CanonicalContent {
        self.profile(tag).adapter.apply(raw)
    }
}
