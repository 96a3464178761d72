//! Row table shared by the reference stores.
//!
//! Every method validates before it mutates, so an error leaves the table untouched.

use crate::artifact::{
    Artifact, ArtifactQuery, ArtifactStatus, MetaPayload, NewArtifact, RawContent, UploadedFile,
    VersionPayload,
};
use crate::constants::UPLOAD_TYPE_TAG;
use crate::error::{StoreError, StoreResult};
use crate::type_tag::TypeTag;
use crate::validation::validate_upload;
use chrono::{DateTime, Utc};
use sdlc_types::{DocumentId, RowId, WorkspaceId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ArtifactTable {
    next_row_id: u64,
    rows: Vec<Artifact>,
}

impl ArtifactTable {
    pub(crate) fn list(&self, workspace_id: WorkspaceId) -> Vec<Artifact> {
        let mut rows: Vec<Artifact> = self
            .rows
            .iter()
            .filter(|r| r.workspace_id == workspace_id && r.is_current())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows
    }

    pub(crate) fn current(&self, document_id: &DocumentId) -> Option<&Artifact> {
        self.rows
            .iter()
            .find(|r| &r.document_id == document_id && r.is_current())
    }

    pub(crate) fn row(&self, row_id: RowId) -> Option<&Artifact> {
        self.rows.iter().find(|r| r.row_id == row_id)
    }

    /// Rows of a workspace matching `query`, any status, most recently updated first.
    pub(crate) fn search(&self, workspace_id: WorkspaceId, query: &ArtifactQuery) -> Vec<Artifact> {
        let mut rows: Vec<Artifact> = self
            .rows
            .iter()
            .filter(|r| r.workspace_id == workspace_id && query.matches(r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows
    }

    pub(crate) fn versions(&self, document_id: &DocumentId) -> Vec<Artifact> {
        let mut rows: Vec<Artifact> = self
            .rows
            .iter()
            .filter(|r| &r.document_id == document_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.version.cmp(&a.version));
        rows
    }

    pub(crate) fn create(
        &mut self,
        workspace_id: WorkspaceId,
        new: &NewArtifact,
        now: DateTime<Utc>,
    ) -> StoreResult<Artifact> {
        if self.rows.iter().any(|r| r.document_id == new.document_id) {
            return Err(StoreError::DuplicateDocument(new.document_id.clone()));
        }
        let row = Artifact {
            row_id: self.next_row_id(),
            document_id: new.document_id.clone(),
            workspace_id,
            type_tag: new.type_tag.clone(),
            title: new.title.as_str().to_owned(),
            content: new.content.clone().normalized(),
            references: new.references.clone(),
            version: 1,
            parent_version: None,
            status: ArtifactStatus::Current,
            created_at: now,
            updated_at: now,
        };
        self.rows.push(row.clone());
        Ok(row)
    }

    pub(crate) fn update_version(
        &mut self,
        document_id: &DocumentId,
        payload: &VersionPayload,
        now: DateTime<Utc>,
    ) -> StoreResult<Artifact> {
        let current = self.current_index(document_id)?;
        check_expected(&self.rows[current], payload.expected_version)?;
        let parent = self.rows[current].version;
        let next = Artifact {
            title: payload.title.clone(),
            content: payload.content.clone().normalized(),
            type_tag: payload.type_tag.clone(),
            references: payload.references.clone(),
            ..self.rows[current].clone()
        };
        Ok(self.push_successor(current, next, parent, now))
    }

    pub(crate) fn set_meta(
        &mut self,
        document_id: &DocumentId,
        payload: &MetaPayload,
        now: DateTime<Utc>,
    ) -> StoreResult<Artifact> {
        let current = self.current_index(document_id)?;
        check_expected(&self.rows[current], payload.expected_version)?;

        let row = &mut self.rows[current];
        if let Some(title) = &payload.title {
            row.title = title.clone();
        }
        if let Some(content) = &payload.content {
            row.content = content.clone().normalized();
        }
        if let Some(type_tag) = &payload.type_tag {
            row.type_tag = type_tag.clone();
        }
        if let Some(references) = &payload.references {
            row.references = references.clone();
        }
        row.updated_at = now;
        Ok(row.clone())
    }

    pub(crate) fn rollback(
        &mut self,
        document_id: &DocumentId,
        target_version: u32,
        now: DateTime<Utc>,
    ) -> StoreResult<Artifact> {
        let target = self
            .rows
            .iter()
            .position(|r| &r.document_id == document_id && r.version == target_version)
            .ok_or_else(|| StoreError::VersionNotFound {
                document_id: document_id.clone(),
                version: target_version,
            })?;

        match self.current_index(document_id) {
            Ok(current) => {
                let source = &self.rows[target];
                let next = Artifact {
                    title: source.title.clone(),
                    content: source.content.clone(),
                    type_tag: source.type_tag.clone(),
                    references: source.references.clone(),
                    ..self.rows[current].clone()
                };
                Ok(self.push_successor(current, next, target_version, now))
            }
            Err(StoreError::NoCurrent(_)) => {
                let row = &mut self.rows[target];
                row.status = ArtifactStatus::Current;
                row.updated_at = now;
                Ok(row.clone())
            }
            Err(err) => Err(err),
        }
    }

    pub(crate) fn delete_row(&mut self, row_id: RowId) -> StoreResult<Artifact> {
        let index = self
            .rows
            .iter()
            .position(|r| r.row_id == row_id)
            .ok_or(StoreError::RowNotFound(row_id))?;
        Ok(self.rows.remove(index))
    }

    /// Removes every row of a document, or only the row of `version`, returning the removed
    /// rows newest first.
    pub(crate) fn delete_document(
        &mut self,
        document_id: &DocumentId,
        version: Option<u32>,
    ) -> StoreResult<Vec<Artifact>> {
        let selected = |r: &Artifact| {
            &r.document_id == document_id && version.map_or(true, |v| r.version == v)
        };
        if !self.rows.iter().any(selected) {
            return Err(match version {
                Some(version) => StoreError::VersionNotFound {
                    document_id: document_id.clone(),
                    version,
                },
                None => StoreError::DocumentNotFound(document_id.clone()),
            });
        }

        let (mut removed, kept): (Vec<Artifact>, Vec<Artifact>) =
            std::mem::take(&mut self.rows).into_iter().partition(selected);
        self.rows = kept;
        removed.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(removed)
    }

    pub(crate) fn upload(
        &mut self,
        workspace_id: WorkspaceId,
        file: &UploadedFile,
        now: DateTime<Utc>,
    ) -> StoreResult<Artifact> {
        let (document_id, text) =
            validate_upload(file).map_err(|e| StoreError::RejectedUpload(e.to_string()))?;
        let title = sdlc_types::Title::new(&file.file_name)
            .map_err(|e| StoreError::RejectedUpload(e.to_string()))?;
        let new = NewArtifact {
            document_id,
            title,
            content: RawContent::Text(text),
            type_tag: TypeTag::from(UPLOAD_TYPE_TAG),
            references: Vec::new(),
        };
        self.create(workspace_id, &new, now)
    }

    fn next_row_id(&mut self) -> RowId {
        self.next_row_id += 1;
        RowId(self.next_row_id)
    }

    fn current_index(&self, document_id: &DocumentId) -> StoreResult<usize> {
        self.rows
            .iter()
            .position(|r| &r.document_id == document_id && r.is_current())
            .ok_or_else(|| StoreError::NoCurrent(document_id.clone()))
    }

    fn max_version(&self, document_id: &DocumentId) -> u32 {
        self.rows
            .iter()
            .filter(|r| &r.document_id == document_id)
            .map(|r| r.version)
            .max()
            .unwrap_or(0)
    }

    /// Archives `current` and appends `next` as the new current version.
    fn push_successor(
        &mut self,
        current: usize,
        mut next: Artifact,
        parent_version: u32,
        now: DateTime<Utc>,
    ) -> Artifact {
        next.row_id = self.next_row_id();
        next.version = self.max_version(&next.document_id) + 1;
        next.parent_version = Some(parent_version);
        next.status = ArtifactStatus::Current;
        next.created_at = now;
        next.updated_at = now;

        let previous = &mut self.rows[current];
        previous.status = ArtifactStatus::Archived;
        previous.updated_at = now;

        self.rows.push(next.clone());
        next
    }
}

fn check_expected(current: &Artifact, expected: Option<u32>) -> StoreResult<()> {
    match expected {
        Some(expected) if expected != current.version => Err(StoreError::VersionConflict {
            document_id: current.document_id.clone(),
            expected,
            actual: current.version,
        }),
        _ => Ok(()),
    }
}
