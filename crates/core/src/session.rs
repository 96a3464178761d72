//! Workspace session: the artifact index, the open set, the active selection and unsaved
//! edits, owned by one struct and changed only through its methods.
//!
//! Invariants kept by every method:
//! - the active document is always a member of the open set
//! - the open set never holds the same document id twice
//! - closing the active document activates the most recently opened remaining one
//! - a draft becomes persisted in place, keeping its document id and open position
//! - only documents of the session's workspace enter the index or are written through it

use crate::artifact::{
    Artifact, ArtifactDraft, ArtifactPatch, ArtifactQuery, RawContent, UploadedFile,
};
use crate::busy::BusyIndicator;
use crate::content::{CanonicalContent, Category};
use crate::registry::{AdapterRegistry, Capability};
use crate::resolver::{self, Resolution};
use crate::store::ArtifactStore;
use crate::type_tag::TypeTag;
use crate::validation::validate_patch;
use crate::versions::{DeleteOutcome, DocumentDeleteOutcome, UpdateMode, VersionManager};
use crate::{ArtifactError, ArtifactResult};
use sdlc_types::{DocumentId, RowId, WorkspaceId};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum OpenEntry {
    Persisted(DocumentId),
    Draft(ArtifactDraft),
}

impl OpenEntry {
    pub fn document_id(&self) -> &DocumentId {
        match self {
            OpenEntry::Persisted(id) => id,
            OpenEntry::Draft(draft) => &draft.document_id,
        }
    }
}

#[derive(Debug, Clone)]
struct OpenSlot {
    entry: OpenEntry,
    opened_seq: u64,
}

/// The active document, persisted or not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveArtifact<'a> {
    Persisted(&'a Artifact),
    Draft(&'a ArtifactDraft),
}

/// Identity a reload was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    document_id: DocumentId,
}

impl LoadTicket {
    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied(Artifact),
    /// The selection moved on while the load was in flight; the result was dropped.
    Stale,
}

pub struct WorkspaceSession<S> {
    workspace_id: WorkspaceId,
    versions: VersionManager<S>,
    registry: AdapterRegistry,
    busy: BusyIndicator,
    index: Vec<Artifact>,
    open: Vec<OpenSlot>,
    active: Option<DocumentId>,
    staged: HashMap<DocumentId, CanonicalContent>,
    preferences: HashMap<TypeTag, Capability>,
    next_seq: u64,
}

impl<S: ArtifactStore> WorkspaceSession<S> {
    pub fn new(workspace_id: WorkspaceId, store: Arc<S>, busy: BusyIndicator) -> Self {
        Self {
            workspace_id,
            versions: VersionManager::new(store),
            registry: AdapterRegistry::new(),
            busy,
            index: Vec::new(),
            open: Vec::new(),
            active: None,
            staged: HashMap::new(),
            preferences: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn with_registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Version manager used by this session. Clone it to run a detached reload.
    pub fn manager(&self) -> &VersionManager<S> {
        &self.versions
    }

    pub fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    /// Current rows known to the session.
    pub fn index(&self) -> &[Artifact] {
        &self.index
    }

    /// Open document ids, in tab order.
    pub fn open_ids(&self) -> Vec<&DocumentId> {
        self.open.iter().map(|s| s.entry.document_id()).collect()
    }

    pub fn is_open(&self, document_id: &DocumentId) -> bool {
        self.slot(document_id).is_some()
    }

    pub fn is_draft(&self, document_id: &DocumentId) -> bool {
        matches!(
            self.slot(document_id).map(|s| &s.entry),
            Some(OpenEntry::Draft(_))
        )
    }

    pub fn has_unsaved(&self, document_id: &DocumentId) -> bool {
        self.staged.contains_key(document_id)
    }

    pub fn active_id(&self) -> Option<&DocumentId> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<ActiveArtifact<'_>> {
        let id = self.active.as_ref()?;
        match &self.slot(id)?.entry {
            OpenEntry::Draft(draft) => Some(ActiveArtifact::Draft(draft)),
            OpenEntry::Persisted(id) => self.indexed(id).map(ActiveArtifact::Persisted),
        }
    }

    pub fn set_preference(&mut self, tag: TypeTag, capability: Capability) {
        self.preferences.insert(tag, capability);
    }

    pub fn preference(&self, tag: &TypeTag) -> Option<Capability> {
        self.preferences.get(tag).copied()
    }

    /// Replaces the index with the workspace's current rows.
    ///
    /// Open persisted documents that no longer have a current row are closed. Drafts are kept.
    pub async fn load(&mut self) -> ArtifactResult<usize> {
        let _busy = self.busy.acquire();
        let rows = self.versions.list(self.workspace_id).await?;
        self.index = rows;

        let gone: Vec<DocumentId> = self
            .open
            .iter()
            .filter_map(|s| match &s.entry {
                OpenEntry::Persisted(id) if self.indexed(id).is_none() => Some(id.clone()),
                _ => None,
            })
            .collect();
        for id in gone {
            tracing::warn!("{id} is no longer in the workspace, closing it");
            self.close(&id);
        }

        tracing::debug!("loaded {} artifacts", self.index.len());
        Ok(self.index.len())
    }

    /// Opens an indexed document, or re-focuses it if already open, and makes it active.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::NotFound` if the document is neither open nor indexed.
    pub fn open(&mut self, document_id: &DocumentId) -> ArtifactResult<()> {
        let seq = self.bump_seq();
        if let Some(slot) = self.slot_mut(document_id) {
            slot.opened_seq = seq;
        } else if self.indexed(document_id).is_some() {
            self.open.push(OpenSlot {
                entry: OpenEntry::Persisted(document_id.clone()),
                opened_seq: seq,
            });
        } else {
            return Err(ArtifactError::NotFound(document_id.clone()));
        }
        self.active = Some(document_id.clone());
        Ok(())
    }

    /// Makes an open document active.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::NotFound` if the document is not open.
    pub fn select(&mut self, document_id: &DocumentId) -> ArtifactResult<()> {
        if !self.is_open(document_id) {
            return Err(ArtifactError::NotFound(document_id.clone()));
        }
        self.active = Some(document_id.clone());
        Ok(())
    }

    /// Closes a document and drops its unsaved edits. Returns whether it was open.
    pub fn close(&mut self, document_id: &DocumentId) -> bool {
        let Some(pos) = self
            .open
            .iter()
            .position(|s| s.entry.document_id() == document_id)
        else {
            return false;
        };
        self.open.remove(pos);
        self.staged.remove(document_id);

        if self.active.as_ref() == Some(document_id) {
            self.active = self
                .open
                .iter()
                .max_by_key(|s| s.opened_seq)
                .map(|s| s.entry.document_id().clone());
        }
        true
    }

    /// Opens a new unsaved document and makes it active.
    ///
    /// The id is a slug of the title, suffixed `-2`, `-3`, … when already in use. The draft
    /// starts with the type's skeleton content.
    pub fn new_draft(&mut self, type_tag: TypeTag, title: &str) -> DocumentId {
        let document_id = self.unique_id(DocumentId::slug_from_title(title));
        let content = self
            .registry
            .normalize(&type_tag, &RawContent::empty_object())
            .to_raw();
        let seq = self.bump_seq();
        self.open.push(OpenSlot {
            entry: OpenEntry::Draft(ArtifactDraft {
                document_id: document_id.clone(),
                type_tag,
                title: title.trim().to_owned(),
                content,
                references: Vec::new(),
            }),
            opened_seq: seq,
        });
        self.active = Some(document_id.clone());
        document_id
    }

    /// Canonical content of an open or indexed document, including unsaved edits.
    pub fn canonical_content(&self, document_id: &DocumentId) -> ArtifactResult<CanonicalContent> {
        if let Some(staged) = self.staged.get(document_id) {
            return Ok(staged.clone());
        }
        let (tag, raw) = self.source(document_id)?;
        Ok(self.registry.normalize(tag, raw))
    }

    /// Resolves the capability and content shape for a document.
    ///
    /// Without an explicit choice the session's preference for the type is used, then the
    /// type's default.
    pub fn resolve(
        &self,
        document_id: &DocumentId,
        choice: Option<&str>,
    ) -> ArtifactResult<Resolution> {
        let (tag, raw) = self.source(document_id)?;
        let staged_raw = self.staged.get(document_id).map(CanonicalContent::to_raw);
        let raw = staged_raw.as_ref().unwrap_or(raw);

        match choice {
            Some(choice) => Ok(resolver::resolve(&self.registry, tag, raw, Some(choice))),
            None => Ok(resolver::resolve_with(
                &self.registry,
                tag,
                raw,
                self.preference(tag),
            )),
        }
    }

    /// Records an unsaved edit emitted by a capability.
    ///
    /// The edit must have the shape of the document's own type. Edits made through an
    /// alternative display (a document type shown as a table, for instance) are rejected, since
    /// the type's adapter could not read them back. Types without a profile accept any shape.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::NotFound` if the document is not open and
    /// `ArtifactError::Validation` if the content's category does not match the type.
    pub fn stage_edit(
        &mut self,
        document_id: &DocumentId,
        content: CanonicalContent,
    ) -> ArtifactResult<()> {
        if !self.is_open(document_id) {
            return Err(ArtifactError::NotFound(document_id.clone()));
        }
        let (tag, _) = self.source(document_id)?;
        let expected = self.registry.profile(tag).adapter.category();
        if expected != Category::Generic && content.category() != expected {
            return Err(ArtifactError::Validation(format!(
                "{document_id} is a {tag} and holds {expected:?} content, not {:?}",
                content.category()
            )));
        }
        self.staged.insert(document_id.clone(), content);
        Ok(())
    }

    pub fn discard_edit(&mut self, document_id: &DocumentId) -> bool {
        self.staged.remove(document_id).is_some()
    }

    /// Persists a document.
    ///
    /// A draft is created as version 1 under its own id and stays open in place. A persisted
    /// document with unsaved edits gets a new version holding them; one without edits is
    /// returned unchanged. The write is rejected with `ArtifactError::VersionConflict` if
    /// someone else saved a newer version since the index was loaded.
    ///
    /// Session state changes only after the store confirms the write.
    pub async fn save(&mut self, document_id: &DocumentId) -> ArtifactResult<Artifact> {
        let staged_raw = self.staged.get(document_id).map(CanonicalContent::to_raw);

        match self.slot(document_id).map(|s| s.entry.clone()) {
            None => Err(ArtifactError::NotFound(document_id.clone())),
            Some(OpenEntry::Draft(mut draft)) => {
                if let Some(raw) = staged_raw {
                    draft.content = raw;
                }
                let _busy = self.busy.acquire();
                let row = self.versions.create(self.workspace_id, &draft).await?;

                if let Some(slot) = self.slot_mut(document_id) {
                    slot.entry = OpenEntry::Persisted(document_id.clone());
                }
                self.staged.remove(document_id);
                self.upsert_index(row.clone());
                Ok(row)
            }
            Some(OpenEntry::Persisted(_)) => {
                let current = self
                    .indexed(document_id)
                    .ok_or_else(|| ArtifactError::NotFound(document_id.clone()))?;
                let Some(raw) = staged_raw else {
                    tracing::debug!("{document_id} has no unsaved edits");
                    return Ok(current.clone());
                };
                let expected = current.version;

                let patch = ArtifactPatch {
                    content: Some(raw),
                    ..Default::default()
                };
                let _busy = self.busy.acquire();
                let row = self
                    .versions
                    .update(document_id, patch, UpdateMode::Versioned, Some(expected))
                    .await?;

                self.staged.remove(document_id);
                self.upsert_index(row.clone());
                Ok(row)
            }
        }
    }

    /// Changes title, type, references or content of a document.
    ///
    /// Drafts are changed in memory and `Ok(None)` is returned. Persisted documents are
    /// written with `mode`, guarded by the version the index holds.
    pub async fn update_fields(
        &mut self,
        document_id: &DocumentId,
        patch: ArtifactPatch,
        mode: UpdateMode,
    ) -> ArtifactResult<Option<Artifact>> {
        validate_patch(&patch)?;
        let replaces_content = patch.content.is_some();

        if let Some(OpenEntry::Draft(draft)) = self.slot_mut(document_id).map(|s| &mut s.entry) {
            let retyped = patch.type_tag.as_ref().is_some_and(|t| *t != draft.type_tag);
            if let Some(title) = patch.title {
                draft.title = title.trim().to_owned();
            }
            if let Some(type_tag) = patch.type_tag {
                draft.type_tag = type_tag;
            }
            if let Some(references) = patch.references {
                draft.references = references;
            }
            if let Some(content) = patch.content {
                draft.content = content;
            }
            // Staged edits are shaped for the old type or replaced by the new content.
            if replaces_content || retyped {
                self.staged.remove(document_id);
            }
            return Ok(None);
        }

        let current = self
            .indexed(document_id)
            .ok_or_else(|| ArtifactError::NotFound(document_id.clone()))?;
        let expected = current.version;
        let retyped = patch.type_tag.as_ref().is_some_and(|t| *t != current.type_tag);

        let _busy = self.busy.acquire();
        let row = self
            .versions
            .update(document_id, patch, mode, Some(expected))
            .await?;

        if replaces_content || retyped {
            self.staged.remove(document_id);
        }
        self.upsert_index(row.clone());
        Ok(Some(row))
    }

    /// Rolls a document back to an earlier version and drops its unsaved edits.
    ///
    /// Documents that are not in the index (their current row was deleted) are accepted only
    /// when every stored row belongs to this workspace.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::NotFound` for documents of other workspaces.
    pub async fn rollback(
        &mut self,
        document_id: &DocumentId,
        target_version: u32,
    ) -> ArtifactResult<Artifact> {
        let _busy = self.busy.acquire();
        self.ensure_owned(document_id).await?;
        let row = self.versions.rollback(document_id, target_version).await?;
        self.staged.remove(document_id);
        self.upsert_index(row.clone());
        Ok(row)
    }

    /// Deletes one version row.
    ///
    /// Deleting a document's current row removes the document from the index and closes it.
    /// No other version is promoted; [`WorkspaceSession::rollback`] to a chosen version restores
    /// it.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::RowNotFound` if the row does not exist or belongs to another
    /// workspace.
    pub async fn delete_row(&mut self, row_id: RowId) -> ArtifactResult<DeleteOutcome> {
        let _busy = self.busy.acquire();
        let row = self.versions.row(row_id).await?;
        if row.workspace_id != self.workspace_id {
            tracing::warn!("refusing to delete row {row_id} of workspace {}", row.workspace_id);
            return Err(ArtifactError::RowNotFound(row_id));
        }
        let outcome = self.versions.delete(row_id).await?;

        if outcome.was_current {
            self.forget(&outcome.removed.document_id);
        }
        Ok(outcome)
    }

    /// Deletes a whole document, or only `version` of it.
    ///
    /// When the document's current row goes, the document leaves the index and is closed, as
    /// with [`WorkspaceSession::delete_row`].
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::NotFound` for unknown documents and documents of other
    /// workspaces, and `ArtifactError::VersionNotFound` if `version` does not exist.
    pub async fn delete_document(
        &mut self,
        document_id: &DocumentId,
        version: Option<u32>,
    ) -> ArtifactResult<DocumentDeleteOutcome> {
        let _busy = self.busy.acquire();
        self.ensure_owned(document_id).await?;
        let outcome = self.versions.delete_document(document_id, version).await?;

        if outcome.was_current {
            self.forget(document_id);
        }
        Ok(outcome)
    }

    /// Every version of a document, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::NotFound` for documents of other workspaces.
    pub async fn versions(&self, document_id: &DocumentId) -> ArtifactResult<Vec<Artifact>> {
        let _busy = self.busy.acquire();
        self.ensure_owned(document_id).await?;
        self.versions.versions(document_id).await
    }

    /// Rows of this workspace matching `query`, of any status.
    pub async fn search(&self, query: &ArtifactQuery) -> ArtifactResult<Vec<Artifact>> {
        let _busy = self.busy.acquire();
        self.versions.search(self.workspace_id, query).await
    }

    /// Uploads a text file as a new document and adds it to the index.
    pub async fn upload(&mut self, file: &UploadedFile) -> ArtifactResult<Artifact> {
        let _busy = self.busy.acquire();
        let row = self.versions.upload(self.workspace_id, file).await?;
        self.upsert_index(row.clone());
        Ok(row)
    }

    /// Starts a reload of the active persisted document.
    pub fn load_ticket(&self) -> Option<LoadTicket> {
        match self.active()? {
            ActiveArtifact::Persisted(row) => Some(LoadTicket {
                document_id: row.document_id.clone(),
            }),
            ActiveArtifact::Draft(_) => None,
        }
    }

    /// Applies a reload result if its document is still the active one.
    pub fn apply_loaded(&mut self, ticket: LoadTicket, row: Artifact) -> LoadOutcome {
        if self.active.as_ref() != Some(&ticket.document_id)
            || row.document_id != ticket.document_id
        {
            tracing::warn!(
                "dropping stale load of {} (active is {:?})",
                ticket.document_id,
                self.active.as_ref().map(DocumentId::as_str)
            );
            return LoadOutcome::Stale;
        }
        self.upsert_index(row.clone());
        LoadOutcome::Applied(row)
    }

    /// Reloads the active document from the store.
    pub async fn reload_active(&mut self) -> ArtifactResult<Option<LoadOutcome>> {
        let Some(ticket) = self.load_ticket() else {
            return Ok(None);
        };
        let row = {
            let _busy = self.busy.acquire();
            self.versions.current(&ticket.document_id).await?
        };
        Ok(Some(self.apply_loaded(ticket, row)))
    }

    /// Checks that a document belongs to this workspace.
    ///
    /// Indexed documents do by construction. Others are looked up in the store and must have
    /// at least one row, all of them in this workspace.
    async fn ensure_owned(&self, document_id: &DocumentId) -> ArtifactResult<()> {
        if self.indexed(document_id).is_some() {
            return Ok(());
        }
        let rows = self.versions.versions(document_id).await?;
        if !rows.is_empty() && rows.iter().all(|r| r.workspace_id == self.workspace_id) {
            Ok(())
        } else {
            Err(ArtifactError::NotFound(document_id.clone()))
        }
    }

    /// Drops a document that has no current row from the index and the open set.
    fn forget(&mut self, document_id: &DocumentId) {
        self.index.retain(|row| &row.document_id != document_id);
        self.close(document_id);
    }

    fn slot(&self, document_id: &DocumentId) -> Option<&OpenSlot> {
        self.open
            .iter()
            .find(|s| s.entry.document_id() == document_id)
    }

    fn slot_mut(&mut self, document_id: &DocumentId) -> Option<&mut OpenSlot> {
        self.open
            .iter_mut()
            .find(|s| s.entry.document_id() == document_id)
    }

    fn indexed(&self, document_id: &DocumentId) -> Option<&Artifact> {
        self.index.iter().find(|r| &r.document_id == document_id)
    }

    fn source(&self, document_id: &DocumentId) -> ArtifactResult<(&TypeTag, &RawContent)> {
        if let Some(OpenEntry::Draft(draft)) = self.slot(document_id).map(|s| &s.entry) {
            return Ok((&draft.type_tag, &draft.content));
        }
        self.indexed(document_id)
            .map(|row| (&row.type_tag, &row.content))
            .ok_or_else(|| ArtifactError::NotFound(document_id.clone()))
    }

    fn upsert_index(&mut self, row: Artifact) {
        match self
            .index
            .iter_mut()
            .find(|r| r.document_id == row.document_id)
        {
            Some(existing) => *existing = row,
            None => self.index.insert(0, row),
        }
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn unique_id(&self, base: DocumentId) -> DocumentId {
        let taken = |id: &DocumentId| self.indexed(id).is_some() || self.is_open(id);
        if !taken(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = base.with_suffix(n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
