//! Constants used throughout the SDLC core crate.

/// Default directory for artifact storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "sdlc_data";

/// Filename of the JSON artifact table inside the data directory.
pub const DEFAULT_STORE_FILE_NAME: &str = "artifacts.json";

/// Workspace used when none is configured.
pub const DEFAULT_WORKSPACE_ID: u64 = 1;

/// Only plain-text uploads are accepted.
pub const UPLOAD_MEDIA_TYPE: &str = "text/plain";

/// Type tag given to uploaded files.
pub const UPLOAD_TYPE_TAG: &str = "doc";

/// Section id used when free text is wrapped into a document.
pub const CONTENT_SECTION_ID: &str = "content";

/// Section label used when free text is wrapped into a document.
pub const CONTENT_SECTION_LABEL: &str = "Content";

/// Plan key holding free text that could not be parsed as a plan.
pub const PLAN_NOTES_KEY: &str = "notes";

/// Notation name recorded for textual diagram sources.
pub const MERMAID_FORMAT: &str = "mermaid";
