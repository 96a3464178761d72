//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! nothing below the binary reads process-wide environment variables.

use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_STORE_FILE_NAME, DEFAULT_WORKSPACE_ID};
use crate::{ArtifactError, ArtifactResult};
use sdlc_types::WorkspaceId;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    workspace_id: WorkspaceId,
    store_file_name: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError::InvalidConfig` if `store_file_name` is empty or is not a plain
    /// file name.
    pub fn new(
        data_dir: PathBuf,
        workspace_id: WorkspaceId,
        store_file_name: String,
    ) -> ArtifactResult<Self> {
        if store_file_name.trim().is_empty() {
            return Err(ArtifactError::InvalidConfig(
                "store_file_name cannot be empty".into(),
            ));
        }
        if store_file_name.contains(['/', '\\']) || store_file_name == ".." {
            return Err(ArtifactError::InvalidConfig(format!(
                "store_file_name must be a plain file name, got {store_file_name:?}"
            )));
        }

        Ok(Self {
            data_dir,
            workspace_id,
            store_file_name,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    /// Full path of the JSON artifact table.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store_file_name)
    }
}

/// Resolve the data directory from an optional environment value.
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Resolve the workspace id from an optional environment value.
///
/// # Errors
///
/// Returns `ArtifactError::InvalidConfig` if the value is present but not a number.
pub fn workspace_id_from_env_value(value: Option<String>) -> ArtifactResult<WorkspaceId> {
    match value.filter(|v| !v.trim().is_empty()) {
        None => Ok(WorkspaceId(DEFAULT_WORKSPACE_ID)),
        Some(raw) => raw
            .parse()
            .map_err(|e: sdlc_types::TypeError| ArtifactError::InvalidConfig(e.to_string())),
    }
}

/// Resolve the store file name from an optional environment value.
pub fn store_file_name_from_env_value(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_STORE_FILE_NAME.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_unset() {
        assert_eq!(data_dir_from_env_value(None), PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(
            data_dir_from_env_value(Some("  ".into())),
            PathBuf::from(DEFAULT_DATA_DIR)
        );
        assert_eq!(
            workspace_id_from_env_value(None).unwrap(),
            WorkspaceId(DEFAULT_WORKSPACE_ID)
        );
        assert_eq!(store_file_name_from_env_value(None), DEFAULT_STORE_FILE_NAME);
    }

    #[test]
    fn test_workspace_id_must_be_numeric() {
        assert_eq!(
            workspace_id_from_env_value(Some("12".into())).unwrap(),
            WorkspaceId(12)
        );
        assert!(matches!(
            workspace_id_from_env_value(Some("twelve".into())),
            Err(ArtifactError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_store_path_joins_data_dir() {
        let cfg = CoreConfig::new(
            PathBuf::from("/tmp/sdlc"),
            WorkspaceId(1),
            "artifacts.json".into(),
        )
        .unwrap();
        assert_eq!(cfg.store_path(), PathBuf::from("/tmp/sdlc/artifacts.json"));
    }

    #[test]
    fn test_store_file_name_must_be_plain() {
        let err = CoreConfig::new(PathBuf::from("."), WorkspaceId(1), "../x.json".into());
        assert!(matches!(err, Err(ArtifactError::InvalidConfig(_))));
        let err = CoreConfig::new(PathBuf::from("."), WorkspaceId(1), " ".into());
        assert!(matches!(err, Err(ArtifactError::InvalidConfig(_))));
    }
}
