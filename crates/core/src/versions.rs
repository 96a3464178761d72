//! Version lifecycle for artifacts.
//!
//! A document moves Draft → Current → Archived, and an archived version can become the content
//! of a new Current again through rollback. Nothing here deletes history except an explicit
//! [`VersionManager::delete`] of a single row or [`VersionManager::delete_document`].

use crate::artifact::{
    Artifact, ArtifactDraft, ArtifactPatch, ArtifactQuery, MetaPayload, NewArtifact, UploadedFile,
    VersionPayload,
};
use crate::store::ArtifactStore;
use crate::validation::{validate_patch, validate_references, validate_title, validate_upload};
use crate::{ArtifactError, ArtifactResult};
use sdlc_types::{DocumentId, RowId, WorkspaceId};
use std::sync::Arc;

/// How an update is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Archive the current row and insert the next version.
    #[default]
    Versioned,
    /// Change the current row in place; the version number stays the same.
    MetadataOnly,
}

/// Result of deleting one version row.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub removed: Artifact,
    /// The removed row was the document's current version. No other version is promoted.
    pub was_current: bool,
}

/// Result of deleting a document or one of its versions.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDeleteOutcome {
    /// Removed rows, newest version first.
    pub removed: Vec<Artifact>,
    /// The document's current row was among them.
    pub was_current: bool,
}

/// Service owning the create/update/rollback/delete state machine.
///
/// Every method makes at most one write to the store, and only after all validation has
/// passed. Store failures are returned unchanged in meaning (see [`ArtifactError`]); the
/// manager holds no state of its own that could drift from the store.
#[derive(Debug)]
pub struct VersionManager<S> {
    store: Arc<S>,
}

impl<S> Clone for VersionManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ArtifactStore> VersionManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Current rows of a workspace, most recently updated first.
    pub async fn list(&self, workspace_id: WorkspaceId) -> ArtifactResult<Vec<Artifact>> {
        Ok(self.store.list(workspace_id).await?)
    }

    /// Persists a draft as version 1 of its document.
    ///
    /// The draft's `document_id` is kept, so anything already pointing at the draft keeps
    /// pointing at the persisted document.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::Validation` for a blank title or a self-reference,
    /// `ArtifactError::AlreadyExists` if the id is taken, and `ArtifactError::Persistence` if
    /// the store fails.
    pub async fn create(
        &self,
        workspace_id: WorkspaceId,
        draft: &ArtifactDraft,
    ) -> ArtifactResult<Artifact> {
        let title = validate_title(&draft.title)?;
        validate_references(&draft.document_id, &draft.references)?;

        let new = NewArtifact {
            document_id: draft.document_id.clone(),
            title,
            content: draft.content.clone(),
            type_tag: draft.type_tag.clone(),
            references: draft.references.clone(),
        };
        let row = self.store.create(workspace_id, &new).await?;
        tracing::info!(
            "created {} ({}) as version {}",
            row.document_id,
            row.type_tag,
            row.version
        );
        Ok(row)
    }

    /// Applies a partial update to a document.
    ///
    /// In [`UpdateMode::Versioned`] the current row is archived and a new current version is
    /// inserted; fields missing from `patch` are copied from the archived row. In
    /// [`UpdateMode::MetadataOnly`] the current row is changed in place.
    ///
    /// # Arguments
    ///
    /// * `document_id` - Document to update
    /// * `patch` - Fields to change; `None` keeps the current value
    /// * `mode` - Versioned or in-place
    /// * `expected_version` - When set, the write is rejected unless the current version still
    ///   has this number
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::Validation` for a blank title, `ArtifactError::NotFound` if the
    /// document has no current version, `ArtifactError::VersionConflict` when
    /// `expected_version` is stale, and `ArtifactError::Persistence` if the store fails.
    pub async fn update(
        &self,
        document_id: &DocumentId,
        patch: ArtifactPatch,
        mode: UpdateMode,
        expected_version: Option<u32>,
    ) -> ArtifactResult<Artifact> {
        let title = validate_patch(&patch)?;
        if let Some(references) = &patch.references {
            validate_references(document_id, references)?;
        }

        let row = match mode {
            UpdateMode::Versioned => {
                let current = self.current(document_id).await?;
                let payload = VersionPayload {
                    title: title.map_or(current.title, |t| t.into_inner()),
                    content: patch.content.unwrap_or(current.content),
                    type_tag: patch.type_tag.unwrap_or(current.type_tag),
                    references: patch.references.unwrap_or(current.references),
                    expected_version,
                };
                self.store.update_version(document_id, &payload).await?
            }
            UpdateMode::MetadataOnly => {
                let payload = MetaPayload {
                    title: title.map(|t| t.into_inner()),
                    content: patch.content,
                    type_tag: patch.type_tag,
                    references: patch.references,
                    expected_version,
                };
                self.store.set_meta(document_id, &payload).await?
            }
        };

        tracing::info!(
            "updated {} to version {} ({mode:?})",
            row.document_id,
            row.version
        );
        Ok(row)
    }

    /// Makes the content of `target_version` current again as a new version.
    ///
    /// Nothing is deleted: the previous current row is archived and the new row records
    /// `target_version` as its parent. If the document currently has no current row, the
    /// target row itself is made current, which is how a caller picks a new current version
    /// after deleting the old one.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::VersionNotFound` if the target does not exist and
    /// `ArtifactError::Persistence` if the store fails.
    pub async fn rollback(
        &self,
        document_id: &DocumentId,
        target_version: u32,
    ) -> ArtifactResult<Artifact> {
        let row = self.store.rollback(document_id, target_version).await?;
        tracing::info!(
            "rolled back {} to version {} (now version {})",
            document_id,
            target_version,
            row.version
        );
        Ok(row)
    }

    /// Removes exactly one version row.
    ///
    /// Deleting the current row does not promote another version; see
    /// [`DeleteOutcome::was_current`].
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::RowNotFound` if no row has this id.
    pub async fn delete(&self, row_id: RowId) -> ArtifactResult<DeleteOutcome> {
        let removed = self.store.delete_row(row_id).await?;
        let was_current = removed.is_current();
        if was_current {
            tracing::warn!(
                "deleted current version {} of {}; document has no current version",
                removed.version,
                removed.document_id
            );
        } else {
            tracing::info!(
                "deleted version {} of {}",
                removed.version,
                removed.document_id
            );
        }
        Ok(DeleteOutcome {
            removed,
            was_current,
        })
    }

    /// Deletes a whole document, or only `version` of it.
    ///
    /// # Arguments
    ///
    /// * `document_id` - Document to delete from
    /// * `version` - Single version to remove; `None` removes every row of the document
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::NotFound` if the document has no rows,
    /// `ArtifactError::VersionNotFound` if `version` does not exist, and
    /// `ArtifactError::Persistence` if the store fails.
    pub async fn delete_document(
        &self,
        document_id: &DocumentId,
        version: Option<u32>,
    ) -> ArtifactResult<DocumentDeleteOutcome> {
        let removed = self.store.delete_document(document_id, version).await?;
        let was_current = removed.iter().any(Artifact::is_current);
        match version {
            Some(version) => tracing::info!("deleted version {version} of {document_id}"),
            None => tracing::info!("deleted {document_id} ({} versions)", removed.len()),
        }
        if was_current && version.is_some() {
            tracing::warn!("{document_id} has no current version");
        }
        Ok(DocumentDeleteOutcome {
            removed,
            was_current,
        })
    }

    /// Looks up one version row by id.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::RowNotFound` if no row has this id.
    pub async fn row(&self, row_id: RowId) -> ArtifactResult<Artifact> {
        self.store
            .get_row(row_id)
            .await?
            .ok_or(ArtifactError::RowNotFound(row_id))
    }

    /// Rows of a workspace matching `query`, of any status, most recently updated first.
    pub async fn search(
        &self,
        workspace_id: WorkspaceId,
        query: &ArtifactQuery,
    ) -> ArtifactResult<Vec<Artifact>> {
        Ok(self.store.search(workspace_id, query).await?)
    }

    /// Returns the current version of a document.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::NotFound` if the document has no current version.
    pub async fn current(&self, document_id: &DocumentId) -> ArtifactResult<Artifact> {
        self.store
            .get_current(document_id)
            .await?
            .ok_or_else(|| ArtifactError::NotFound(document_id.clone()))
    }

    /// Every version of a document, newest first.
    pub async fn versions(&self, document_id: &DocumentId) -> ArtifactResult<Vec<Artifact>> {
        Ok(self.store.get_versions(document_id).await?)
    }

    /// Creates a document from an uploaded plain-text file.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::Validation` if the file is not UTF-8 `text/plain`, and
    /// `ArtifactError::AlreadyExists` if a document with the file's name exists.
    pub async fn upload(
        &self,
        workspace_id: WorkspaceId,
        file: &UploadedFile,
    ) -> ArtifactResult<Artifact> {
        validate_upload(file)?;
        let row = self.store.upload(workspace_id, file).await?;
        tracing::info!("uploaded {} as {}", file.file_name, row.document_id);
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::RawContent;
    use crate::store::MemoryArtifactStore;
    use crate::type_tag::TypeTag;

    fn manager() -> VersionManager<MemoryArtifactStore> {
        VersionManager::new(Arc::new(MemoryArtifactStore::new()))
    }

    fn draft(id: &str, title: &str) -> ArtifactDraft {
        ArtifactDraft {
            document_id: DocumentId::parse(id).unwrap(),
            type_tag: TypeTag::BrainstormingNote,
            title: title.into(),
            content: RawContent::Text("first".into()),
            references: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title_before_store() {
        let vm = manager();
        let err = vm.create(WorkspaceId(1), &draft("idea", "  ")).await.unwrap_err();
        assert!(matches!(err, ArtifactError::Validation(_)));
        assert!(vm.list(WorkspaceId(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_versioned_update_fills_omitted_fields() {
        let vm = manager();
        let created = vm.create(WorkspaceId(1), &draft("idea", "Idea")).await.unwrap();
        let patch = ArtifactPatch {
            content: Some(RawContent::Text("second".into())),
            ..Default::default()
        };
        let v2 = vm
            .update(&created.document_id, patch, UpdateMode::Versioned, None)
            .await
            .unwrap();
        assert_eq!(v2.version, 2);
        assert_eq!(v2.title, "Idea");
        assert_eq!(v2.content, RawContent::Text("second".into()));
        assert_eq!(v2.type_tag, TypeTag::BrainstormingNote);
    }

    #[tokio::test]
    async fn test_metadata_update_keeps_version() {
        let vm = manager();
        let created = vm.create(WorkspaceId(1), &draft("idea", "Idea")).await.unwrap();
        let patch = ArtifactPatch {
            title: Some("Better idea".into()),
            ..Default::default()
        };
        let row = vm
            .update(&created.document_id, patch, UpdateMode::MetadataOnly, None)
            .await
            .unwrap();
        assert_eq!(row.version, 1);
        assert_eq!(row.row_id, created.row_id);
        assert_eq!(row.title, "Better idea");
        assert_eq!(vm.versions(&created.document_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_expected_version_conflicts() {
        let vm = manager();
        let created = vm.create(WorkspaceId(1), &draft("idea", "Idea")).await.unwrap();
        vm.update(&created.document_id, ArtifactPatch::default(), UpdateMode::Versioned, Some(1))
            .await
            .unwrap();
        let err = vm
            .update(&created.document_id, ArtifactPatch::default(), UpdateMode::Versioned, Some(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::VersionConflict {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_update_unknown_document_is_not_found() {
        let vm = manager();
        let id = DocumentId::parse("missing").unwrap();
        let err = vm
            .update(&id, ArtifactPatch::default(), UpdateMode::Versioned, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_current_reports_it() {
        let vm = manager();
        let created = vm.create(WorkspaceId(1), &draft("idea", "Idea")).await.unwrap();
        let outcome = vm.delete(created.row_id).await.unwrap();
        assert!(outcome.was_current);
        assert!(matches!(
            vm.current(&created.document_id).await,
            Err(ArtifactError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rollback_to_missing_version() {
        let vm = manager();
        let created = vm.create(WorkspaceId(1), &draft("idea", "Idea")).await.unwrap();
        let err = vm.rollback(&created.document_id, 9).await.unwrap_err();
        assert!(matches!(err, ArtifactError::VersionNotFound { version: 9, .. }));
    }

    #[tokio::test]
    async fn test_delete_document_version_reports_current() {
        let vm = manager();
        let created = vm.create(WorkspaceId(1), &draft("idea", "Idea")).await.unwrap();
        vm.update(&created.document_id, ArtifactPatch::default(), UpdateMode::Versioned, None)
            .await
            .unwrap();

        let archived = vm.delete_document(&created.document_id, Some(1)).await.unwrap();
        assert!(!archived.was_current);
        assert_eq!(archived.removed[0].version, 1);

        let current = vm.delete_document(&created.document_id, Some(2)).await.unwrap();
        assert!(current.was_current);
        assert!(matches!(
            vm.current(&created.document_id).await,
            Err(ArtifactError::NotFound(_))
        ));
        assert!(matches!(
            vm.delete_document(&created.document_id, None).await,
            Err(ArtifactError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_row_lookup_and_search() {
        let vm = manager();
        let created = vm.create(WorkspaceId(1), &draft("idea", "Idea")).await.unwrap();
        assert_eq!(vm.row(created.row_id).await.unwrap(), created);
        assert!(matches!(
            vm.row(RowId(999)).await,
            Err(ArtifactError::RowNotFound(RowId(999)))
        ));

        let query = ArtifactQuery {
            keyword: Some("FIRST".into()),
            ..Default::default()
        };
        assert_eq!(vm.search(WorkspaceId(1), &query).await.unwrap().len(), 1);
        assert!(vm.search(WorkspaceId(2), &query).await.unwrap().is_empty());
    }
}
