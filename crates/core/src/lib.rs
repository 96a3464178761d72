//! # SDLC Core
//!
//! Content normalization, display dispatch and version management for SDLC artifacts.
//!
//! This crate contains:
//! - Adapters that turn stored content of any age into one canonical shape per category
//! - The resolver that picks a display capability for an artifact
//! - The version lifecycle over a pluggable [`ArtifactStore`]
//! - The workspace session holding open documents, the active selection and unsaved edits
//!
//! **No transport concerns**: rendering, HTTP and authentication live outside this crate.

pub mod adapters;
pub mod artifact;
pub mod busy;
pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod store;
pub mod type_tag;
pub mod validation;
pub mod versions;

pub use artifact::{
    Artifact, ArtifactDraft, ArtifactPatch, ArtifactQuery, ArtifactStatus, RawContent,
    UploadedFile,
};
pub use busy::{BusyGuard, BusyIndicator};
pub use config::CoreConfig;
pub use content::{CanonicalContent, Category};
pub use error::{ArtifactError, ArtifactResult, StoreError, StoreResult};
pub use registry::{AdapterRegistry, Capability, TypeProfile};
pub use resolver::{resolve, Resolution};
pub use session::{ActiveArtifact, LoadOutcome, LoadTicket, WorkspaceSession};
pub use store::{ArtifactStore, JsonFileArtifactStore, MemoryArtifactStore};
pub use type_tag::{Phase, TypeTag};
pub use versions::{DeleteOutcome, DocumentDeleteOutcome, UpdateMode, VersionManager};

/// Normalizes raw content for a type with the built-in adapters.
///
/// Never fails: unreadable content yields the type's skeleton or a single free-text section.
pub fn normalize(type_tag: &TypeTag, raw: &RawContent) -> CanonicalContent {
    registry::builtin_profile(type_tag).adapter.apply(raw)
}
