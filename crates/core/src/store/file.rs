use super::table::ArtifactTable;
use super::ArtifactStore;
use crate::artifact::{
    Artifact, ArtifactQuery, MetaPayload, NewArtifact, UploadedFile, VersionPayload,
};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use sdlc_types::{DocumentId, RowId, WorkspaceId};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Store that snapshots the whole row table to one JSON file.
///
/// Each mutation works on a copy of the table, writes the copy to a temporary file beside the
/// target and renames it into place. The in-memory table is replaced only after the rename
/// succeeds, so a failed write leaves both the file and the store unchanged.
#[derive(Debug)]
pub struct JsonFileArtifactStore {
    path: PathBuf,
    table: Mutex<ArtifactTable>,
}

impl JsonFileArtifactStore {
    /// Opens the store at `path`, starting empty if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::FileRead` or `StoreError::Deserialization` if an existing file cannot
    /// be read.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let table = if path.exists() {
            let json = fs::read_to_string(&path).map_err(StoreError::FileRead)?;
            serde_json::from_str(&json).map_err(StoreError::Deserialization)?
        } else {
            ArtifactTable::default()
        };
        tracing::debug!("opened artifact store at {}", path.display());
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn table(&self) -> StoreResult<MutexGuard<'_, ArtifactTable>> {
        self.table
            .lock()
            .map_err(|_| StoreError::Unavailable("artifact table lock poisoned".into()))
    }

    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut ArtifactTable) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.table()?;
        let mut next = guard.clone();
        let out = op(&mut next)?;
        write_snapshot(&self.path, &next)?;
        *guard = next;
        Ok(out)
    }
}

fn write_snapshot(path: &Path, table: &ArtifactTable) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(StoreError::StorageDirCreation)?;
        }
    }

    let json = serde_json::to_string_pretty(table).map_err(StoreError::Serialization)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!("{file_name}.{}.tmp", Uuid::new_v4()));

    fs::write(&temp_path, json).map_err(StoreError::FileWrite)?;
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::FileWrite(err));
    }
    Ok(())
}

#[async_trait]
impl ArtifactStore for JsonFileArtifactStore {
    async fn list(&self, workspace_id: WorkspaceId) -> StoreResult<Vec<Artifact>> {
        Ok(self.table()?.list(workspace_id))
    }

    async fn create(&self, workspace_id: WorkspaceId, new: &NewArtifact) -> StoreResult<Artifact> {
        self.mutate(|t| t.create(workspace_id, new, Utc::now()))
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
        self.mutate(|t| t.update_version(document_id, payload, Utc::now()))
    }

    async fn set_meta(
        &self,
        document_id: &DocumentId,
        payload: &MetaPayload,
    ) -> StoreResult<Artifact> {
        self.mutate(|t| t.set_meta(document_id, payload, Utc::now()))
    }

    async fn rollback(
        &self,
        document_id: &DocumentId,
        target_version: u32,
    ) -> StoreResult<Artifact> {
        self.mutate(|t| t.rollback(document_id, target_version, Utc::now()))
    }

    async fn get_versions(&self, document_id: &DocumentId) -> StoreResult<Vec<Artifact>> {
        Ok(self.table()?.versions(document_id))
    }

    async fn delete_row(&self, row_id: RowId) -> StoreResult<Artifact> {
        self.mutate(|t| t.delete_row(row_id))
    }

    async fn delete_document(
        &self,
        document_id: &DocumentId,
        version: Option<u32>,
    ) -> StoreResult<Vec<Artifact>> {
        self.mutate(|t| t.delete_document(document_id, version))
    }

    async fn upload(
        &self,
        workspace_id: WorkspaceId,
        file: &UploadedFile,
    ) -> StoreResult<Artifact> {
        self.mutate(|t| t.upload(workspace_id, file, Utc::now()))
    }
}
