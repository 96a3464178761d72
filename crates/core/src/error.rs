use sdlc_types::{DocumentId, RowId};

/// Failures reported by an [`ArtifactStore`](crate::store::ArtifactStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document {0} has no current version")]
    NoCurrent(DocumentId),
    #[error("document {document_id} has no version {version}")]
    VersionNotFound {
        document_id: DocumentId,
        version: u32,
    },
    #[error("version row {0} not found")]
    RowNotFound(RowId),
    #[error("document {0} has no rows")]
    DocumentNotFound(DocumentId),
    #[error("document {0} already exists")]
    DuplicateDocument(DocumentId),
    #[error("document {document_id} is at version {actual}, expected {expected}")]
    VersionConflict {
        document_id: DocumentId,
        expected: u32,
        actual: u32,
    },
    #[error("rejected upload: {0}")]
    RejectedUpload(String),
    #[error("failed to create store directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read store file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write store file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize store: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize store: {0}")]
    Deserialization(serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("document not found: {0}")]
    NotFound(DocumentId),
    #[error("document {document_id} has no version {version}")]
    VersionNotFound {
        document_id: DocumentId,
        version: u32,
    },
    #[error("version row not found: {0}")]
    RowNotFound(RowId),
    #[error("document already exists: {0}")]
    AlreadyExists(DocumentId),
    #[error(
        "document {document_id} changed since it was loaded (expected version {expected}, found {actual})"
    )]
    VersionConflict {
        document_id: DocumentId,
        expected: u32,
        actual: u32,
    },
    #[error("artifact store failed: {0}")]
    Persistence(#[source] StoreError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ArtifactResult<T> = std::result::Result<T, ArtifactError>;

impl From<StoreError> for ArtifactError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NoCurrent(document_id) | StoreError::DocumentNotFound(document_id) => {
                ArtifactError::NotFound(document_id)
            }
            StoreError::VersionNotFound {
                document_id,
                version,
            } => ArtifactError::VersionNotFound {
                document_id,
                version,
            },
            StoreError::RowNotFound(row_id) => ArtifactError::RowNotFound(row_id),
            StoreError::DuplicateDocument(document_id) => ArtifactError::AlreadyExists(document_id),
            StoreError::VersionConflict {
                document_id,
                expected,
                actual,
            } => ArtifactError::VersionConflict {
                document_id,
                expected,
                actual,
            },
            StoreError::RejectedUpload(reason) => ArtifactError::Validation(reason),
            other => ArtifactError::Persistence(other),
        }
    }
}

impl From<sdlc_types::TypeError> for ArtifactError {
    fn from(err: sdlc_types::TypeError) -> Self {
        ArtifactError::Validation(err.to_string())
    }
}
