use super::table::ArtifactTable;
use super::ArtifactStore;
use crate::artifact::{
    Artifact, ArtifactQuery, MetaPayload, NewArtifact, UploadedFile, VersionPayload,
};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use sdlc_types::{DocumentId, RowId, WorkspaceId};
use std::sync::{Mutex, MutexGuard};

/// Store that keeps every row in process memory.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    table: Mutex<ArtifactTable>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> StoreResult<MutexGuard<'_, ArtifactTable>> {
        self.table
            .lock()
            .map_err(|_| StoreError::Unavailable("artifact table lock poisoned".into()))
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn list(&self, workspace_id: WorkspaceId) -> StoreResult<Vec<Artifact>> {
        Ok(self.table()?.list(workspace_id))
    }

    async fn create(&self, workspace_id: WorkspaceId, new: &NewArtifact) -> StoreResult<Artifact> {
        self.table()?.create(workspace_id, new, Utc::now())
    }

    async fn get_current(&self, document_id: &DocumentId) -> StoreResult<Option<Artifact>> {
        Ok(self.table()?.current(document_id).cloned())
    }

    async fn get_row(&self, row_id: RowId) -> StoreResult<Option<Artifact>> {
        Ok(self.table()?.row(row_id).cloned())
    }

    async fn search(
        &self,
        workspace_id: WorkspaceId,
        query: &ArtifactQuery,
    ) -> StoreResult<Vec<Artifact>> {
        Ok(self.table()?.search(workspace_id, query))
    }

    async fn update_version(
        &self,
        document_id: &DocumentId,
        payload: &VersionPayload,
    ) -> StoreResult<Artifact> {
        self.table()?.update_version(document_id, payload, Utc::now())
    }

    async fn set_meta(
        &self,
        document_id: &DocumentId,
        payload: &MetaPayload,
    ) -> StoreResult<Artifact> {
        self.table()?.set_meta(document_id, payload, Utc::now())
    }

    async fn rollback(
        &self,
        document_id: &DocumentId,
        target_version: u32,
    ) -> StoreResult<Artifact> {
        self.table()?.rollback(document_id, target_version, Utc::now())
    }

    async fn get_versions(&self, document_id: &DocumentId) -> StoreResult<Vec<Artifact>> {
        Ok(self.table()?.versions(document_id))
    }

    async fn delete_row(&self, row_id: RowId) -> StoreResult<Artifact> {
        self.table()?.delete_row(row_id)
    }

    async fn delete_document(
        &self,
        document_id: &DocumentId,
        version: Option<u32>,
    ) -> StoreResult<Vec<Artifact>> {
        self.table()?.delete_document(document_id, version)
    }

    async fn upload(
        &self,
        workspace_id: WorkspaceId,
        file: &UploadedFile,
    ) -> StoreResult<Artifact> {
        self.table()?.upload(workspace_id, file, Utc::now())
    }
}
