//! Artifact persistence.
//!
//! [`ArtifactStore`] is the seam to whatever backend holds the version rows. Two reference
//! backends ship with the crate: [`MemoryArtifactStore`] and [`JsonFileArtifactStore`]. Both
//! apply an operation completely or not at all.

mod file;
mod memory;
mod table;

pub use file::JsonFileArtifactStore;
pub use memory::MemoryArtifactStore;

use crate::artifact::{
    Artifact, ArtifactQuery, MetaPayload, NewArtifact, UploadedFile, VersionPayload,
};
use crate::error::StoreResult;
use async_trait::async_trait;
use sdlc_types::{DocumentId, RowId, WorkspaceId};

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Current rows of a workspace, most recently updated first.
    async fn list(&self, workspace_id: WorkspaceId) -> StoreResult<Vec<Artifact>>;

    /// Inserts version 1 of a new document as its current row.
    async fn create(&self, workspace_id: WorkspaceId, new: &NewArtifact) -> StoreResult<Artifact>;

    async fn get_current(&self, document_id: &DocumentId) -> StoreResult<Option<Artifact>>;

    async fn get_row(&self, row_id: RowId) -> StoreResult<Option<Artifact>>;

    /// Rows of a workspace matching `query`, of any status, most recently updated first.
    async fn search(
        &self,
        workspace_id: WorkspaceId,
        query: &ArtifactQuery,
    ) -> StoreResult<Vec<Artifact>>;

    /// Archives the current row and inserts the next version as current.
    async fn update_version(
        &self,
        document_id: &DocumentId,
        payload: &VersionPayload,
    ) -> StoreResult<Artifact>;

    /// Changes the current row in place without a new version.
    async fn set_meta(&self, document_id: &DocumentId, payload: &MetaPayload)
        -> StoreResult<Artifact>;

    /// Copies an earlier version into a new current version.
    ///
    /// When the document has no current row (its current row was deleted), the target row is
    /// made current again instead.
    async fn rollback(&self, document_id: &DocumentId, target_version: u32)
        -> StoreResult<Artifact>;

    /// Every row of a document, newest version first.
    async fn get_versions(&self, document_id: &DocumentId) -> StoreResult<Vec<Artifact>>;

    /// Removes exactly one row and returns it.
    async fn delete_row(&self, row_id: RowId) -> StoreResult<Artifact>;

    /// Removes every row of a document, or only the row of `version`. Returns the removed rows,
    /// newest first.
    async fn delete_document(
        &self,
        document_id: &DocumentId,
        version: Option<u32>,
    ) -> StoreResult<Vec<Artifact>>;

    /// Creates a document from a plain-text file.
    async fn upload(&self, workspace_id: WorkspaceId, file: &UploadedFile)
        -> StoreResult<Artifact>;
}
