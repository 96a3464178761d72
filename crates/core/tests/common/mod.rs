//! Helpers shared by the integration tests.

use sdlc_core::artifact::{ArtifactQuery, MetaPayload, NewArtifact, VersionPayload};
use sdlc_core::{
    Artifact, ArtifactStore, MemoryArtifactStore, StoreError, StoreResult, UploadedFile,
};
use sdlc_types::{DocumentId, RowId, WorkspaceId};

/// Store whose writes always fail, for checking that callers see the error and nothing else
/// changes.
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryArtifactStore,
}

fn offline() -> StoreError {
    StoreError::Unavailable("backend offline".into())
}

#[async_trait::async_trait]
impl ArtifactStore for FailingStore {
    async fn list(&self, workspace_id: WorkspaceId) -> StoreResult<Vec<Artifact>> {
        self.inner.list(workspace_id).await
    }

    async fn create(&self, _: WorkspaceId, _: &NewArtifact) -> StoreResult<Artifact> {
        Err(offline())
    }

    async fn get_current(&self, document_id: &DocumentId) -> StoreResult<Option<Artifact>> {
        self.inner.get_current(document_id).await
    }

    async fn get_row(&self, row_id: RowId) -> StoreResult<Option<Artifact>> {
        self.inner.get_row(row_id).await
    }

    async fn search(
        &self,
        workspace_id: WorkspaceId,
        query: &ArtifactQuery,
    ) -> StoreResult<Vec<Artifact>> {
        self.inner.search(workspace_id, query).await
    }

    async fn update_version(&self, _: &DocumentId, _: &VersionPayload) -> StoreResult<Artifact> {
        Err(offline())
    }

    async fn set_meta(&self, _: &DocumentId, _: &MetaPayload) -> StoreResult<Artifact> {
        Err(offline())
    }

    async fn rollback(&self, _: &DocumentId, _: u32) -> StoreResult<Artifact> {
        Err(offline())
    }

    async fn get_versions(&self, document_id: &DocumentId) -> StoreResult<Vec<Artifact>> {
        self.inner.get_versions(document_id).await
    }

    async fn delete_row(&self, _: RowId) -> StoreResult<Artifact> {
        Err(offline())
    }

    async fn delete_document(&self, _: &DocumentId, _: Option<u32>) -> StoreResult<Vec<Artifact>> {
        Err(offline())
    }

    async fn upload(&self, _: WorkspaceId, _: &UploadedFile) -> StoreResult<Artifact> {
        Err(offline())
    }
}

