//! Input validation utilities.
//!
//! These run before anything reaches the store, so a rejected request never leaves a partial
//! write behind.

use crate::artifact::{ArtifactPatch, UploadedFile};
use crate::constants::UPLOAD_MEDIA_TYPE;
use crate::{ArtifactError, ArtifactResult};
use sdlc_types::{DocumentId, Title};

/// Validates a title supplied by a caller.
///
/// # Errors
///
/// Returns `ArtifactError::Validation` if the title is empty or whitespace only.
pub fn validate_title(title: &str) -> ArtifactResult<Title> {
    Ok(Title::new(title)?)
}

/// Validates the optional fields of a patch.
///
/// Only a supplied title is checked. Omitted fields are filled from the current version later.
pub fn validate_patch(patch: &ArtifactPatch) -> ArtifactResult<Option<Title>> {
    patch.title.as_deref().map(validate_title).transpose()
}

/// Checks that a reference list does not point back at its own document.
pub fn validate_references(
    document_id: &DocumentId,
    references: &[DocumentId],
) -> ArtifactResult<()> {
    if references.iter().any(|r| r == document_id) {
        return Err(ArtifactError::Validation(format!(
            "document {document_id} cannot reference itself"
        )));
    }
    Ok(())
}

/// Validates an uploaded file and returns its text.
///
/// Accepts `text/plain` (parameters such as `charset` are ignored) with UTF-8 content and a file
/// name usable as a document id.
pub fn validate_upload(file: &UploadedFile) -> ArtifactResult<(DocumentId, String)> {
    let essence = file
        .media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence != UPLOAD_MEDIA_TYPE {
        return Err(ArtifactError::Validation(format!(
            "only {UPLOAD_MEDIA_TYPE} files are accepted, got {:?}",
            file.media_type
        )));
    }

    let document_id = DocumentId::parse(&file.file_name)?;
    let text = std::str::from_utf8(&file.bytes)
        .map_err(|_| ArtifactError::Validation("file must be UTF-8 encoded text".into()))?;
    Ok((document_id, text.to_owned()))
}
