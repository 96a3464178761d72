use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use sdlc_core::config::{
    data_dir_from_env_value, store_file_name_from_env_value, workspace_id_from_env_value,
};
use sdlc_core::constants::UPLOAD_MEDIA_TYPE;
use sdlc_core::resolver::available_capabilities;
use sdlc_core::{
    AdapterRegistry, ArtifactPatch, ArtifactQuery, ArtifactStatus, BusyIndicator, CoreConfig,
    JsonFileArtifactStore, RawContent, TypeTag, UpdateMode, UploadedFile, WorkspaceSession,
};
use sdlc_types::{DocumentId, RowId};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sdlc")]
#[command(about = "SDLC artifact workspace CLI")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in artifact types with their display capabilities
    Types,
    /// Normalize content for a type without touching the store
    Normalize {
        /// Artifact type tag, for example `test_cases`
        type_tag: String,
        /// Inline content (JSON or plain text)
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read content from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List current artifacts of the workspace
    List,
    /// Show the current version of a document with its canonical content
    Show {
        /// Document id
        document_id: String,
    },
    /// Resolve the display capability and content shape of a document
    Resolve {
        /// Document id
        document_id: String,
        /// Display capability to use instead of the type's default
        #[arg(long)]
        choice: Option<String>,
    },
    /// Create a new document as version 1
    Create {
        /// Artifact type tag
        type_tag: String,
        /// Document title
        title: String,
        /// Inline content (JSON or plain text); the type's skeleton is used when omitted
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read content from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Referenced document id (repeatable)
        #[arg(long = "ref")]
        references: Vec<String>,
    },
    /// Update a document, creating a new version unless `--meta-only` is given
    Update {
        /// Document id
        document_id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New inline content (JSON or plain text)
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read new content from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// New type tag
        #[arg(long = "type")]
        type_tag: Option<String>,
        /// Replace references with these document ids (repeatable)
        #[arg(long = "ref")]
        references: Vec<String>,
        /// Change the current version in place
        #[arg(long)]
        meta_only: bool,
        /// Reject the update unless the current version has this number
        #[arg(long)]
        expect_version: Option<u32>,
    },
    /// Make an earlier version current again
    Rollback {
        /// Document id
        document_id: String,
        /// Version to restore
        version: u32,
    },
    /// List every version of a document, newest first
    Versions {
        /// Document id
        document_id: String,
    },
    /// Delete one version row
    Delete {
        /// Row id
        row_id: String,
    },
    /// Delete every version of a document, or one version with `--version`
    DeleteDocument {
        /// Document id
        document_id: String,
        /// Only delete this version
        #[arg(long)]
        version: Option<u32>,
    },
    /// Search rows of the workspace, all versions and statuses included
    Search {
        /// Only rows of this type
        #[arg(long = "type")]
        type_tag: Option<String>,
        /// Only rows with this version number
        #[arg(long)]
        version: Option<u32>,
        /// Only rows with this status (`current` or `superseded`)
        #[arg(long)]
        status: Option<String>,
        /// Case-insensitive text matched against title and content
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Upload a plain-text file as a new document
    Upload {
        /// Path of the file
        path: PathBuf,
        /// Media type reported for the file
        #[arg(long, default_value = UPLOAD_MEDIA_TYPE)]
        media_type: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sdlc=info".parse()?)
                .add_directive("sdlc_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = CoreConfig::new(
        data_dir_from_env_value(std::env::var("SDLC_DATA_DIR").ok()),
        workspace_id_from_env_value(std::env::var("SDLC_WORKSPACE").ok())?,
        store_file_name_from_env_value(std::env::var("SDLC_STORE_FILE").ok()),
    )?;

    let Some(command) = cli.command else {
        println!("Use --help to see available commands");
        return Ok(());
    };

    match command {
        Commands::Types => {
            let registry = AdapterRegistry::new();
            let types: Vec<Value> = TypeTag::BUILTIN
                .iter()
                .map(|tag| {
                    json!({
                        "type": tag.as_str(),
                        "label": tag.label(),
                        "phase": tag.phase(),
                        "capabilities": available_capabilities(&registry, tag),
                    })
                })
                .collect();
            emit(cli.format, &types)
        }
        Commands::Normalize {
            type_tag,
            content,
            file,
        } => {
            let raw = read_content(content, file)?.unwrap_or_default();
            let canonical = sdlc_core::normalize(&TypeTag::from(type_tag.as_str()), &raw);
            emit(cli.format, &canonical.to_value())
        }
        Commands::List => {
            let (_, session) = open_session(&cfg).await?;
            emit(cli.format, session.index())
        }
        Commands::Show { document_id } => {
            let (_, mut session) = open_session(&cfg).await?;
            let id = DocumentId::parse(&document_id)?;
            session.open(&id)?;
            let row = session.manager().current(&id).await?;
            let content = session.canonical_content(&id)?;
            emit(
                cli.format,
                &json!({
                    "artifact": row,
                    "category": content.category(),
                    "content": content.to_value(),
                }),
            )
        }
        Commands::Resolve {
            document_id,
            choice,
        } => {
            let (_, mut session) = open_session(&cfg).await?;
            let id = DocumentId::parse(&document_id)?;
            session.open(&id)?;
            let resolution = session.resolve(&id, choice.as_deref())?;
            emit(
                cli.format,
                &json!({
                    "capability": resolution.capability,
                    "content": resolution.content.to_value(),
                }),
            )
        }
        Commands::Create {
            type_tag,
            title,
            content,
            file,
            references,
        } => {
            let (_, mut session) = open_session(&cfg).await?;
            let id = session.new_draft(TypeTag::from(type_tag.as_str()), &title);
            let patch = ArtifactPatch {
                content: read_content(content, file)?,
                references: parse_references(&references)?,
                ..Default::default()
            };
            if !patch.is_empty() {
                session
                    .update_fields(&id, patch, UpdateMode::Versioned)
                    .await?;
            }
            let row = session.save(&id).await?;
            emit(cli.format, &row)
        }
        Commands::Update {
            document_id,
            title,
            content,
            file,
            type_tag,
            references,
            meta_only,
            expect_version,
        } => {
            let id = DocumentId::parse(&document_id)?;
            let patch = ArtifactPatch {
                title,
                content: read_content(content, file)?,
                type_tag: type_tag.as_deref().map(TypeTag::from),
                references: parse_references(&references)?,
            };
            if patch.is_empty() {
                anyhow::bail!("nothing to update: pass at least one field");
            }
            let mode = if meta_only {
                UpdateMode::MetadataOnly
            } else {
                UpdateMode::Versioned
            };
            let (_, session) = open_session(&cfg).await?;
            if !session.index().iter().any(|row| row.document_id == id) {
                anyhow::bail!("artifact not found: {id}");
            }
            let row = session
                .manager()
                .update(&id, patch, mode, expect_version)
                .await?;
            emit(cli.format, &row)
        }
        Commands::Rollback {
            document_id,
            version,
        } => {
            let (_, mut session) = open_session(&cfg).await?;
            let id = DocumentId::parse(&document_id)?;
            let row = session.rollback(&id, version).await?;
            emit(cli.format, &row)
        }
        Commands::Versions { document_id } => {
            let (_, session) = open_session(&cfg).await?;
            let id = DocumentId::parse(&document_id)?;
            let rows = session.versions(&id).await?;
            emit(cli.format, &rows)
        }
        Commands::Delete { row_id } => {
            let (_, mut session) = open_session(&cfg).await?;
            let row_id: RowId = row_id.parse()?;
            let outcome = session.delete_row(row_id).await?;
            if outcome.was_current {
                eprintln!(
                    "{} has no current version; use `sdlc rollback {} <version>` to pick one",
                    outcome.removed.document_id, outcome.removed.document_id
                );
            }
            emit(cli.format, &outcome.removed)
        }
        Commands::DeleteDocument {
            document_id,
            version,
        } => {
            let (_, mut session) = open_session(&cfg).await?;
            let id = DocumentId::parse(&document_id)?;
            let outcome = session.delete_document(&id, version).await?;
            if outcome.was_current && version.is_some() {
                eprintln!(
                    "{id} has no current version; use `sdlc rollback {id} <version>` to pick one"
                );
            }
            emit(cli.format, &outcome.removed)
        }
        Commands::Search {
            type_tag,
            version,
            status,
            keyword,
        } => {
            let (_, session) = open_session(&cfg).await?;
            let query = ArtifactQuery {
                type_tag: type_tag.as_deref().map(TypeTag::from),
                version,
                status: status
                    .as_deref()
                    .map(str::parse::<ArtifactStatus>)
                    .transpose()?,
                keyword,
            };
            let rows = session.search(&query).await?;
            emit(cli.format, &rows)
        }
        Commands::Upload { path, media_type } => {
            let (_, mut session) = open_session(&cfg).await?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("{} has no usable file name", path.display()))?
                .to_owned();
            let bytes = std::fs::read(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let row = session
                .upload(&UploadedFile {
                    file_name,
                    media_type,
                    bytes,
                })
                .await?;
            emit(cli.format, &row)
        }
    }
}

/// Opens the workspace's store and loads its index into a fresh session.
async fn open_session(
    cfg: &CoreConfig,
) -> anyhow::Result<(Arc<JsonFileArtifactStore>, WorkspaceSession<JsonFileArtifactStore>)> {
    let path = cfg.store_path();
    let store = Arc::new(
        JsonFileArtifactStore::open(&path)
            .with_context(|| format!("opening {}", path.display()))?,
    );
    let mut session =
        WorkspaceSession::new(cfg.workspace_id(), store.clone(), BusyIndicator::new());
    let count = session.load().await?;
    tracing::debug!("loaded {count} artifacts from {}", path.display());
    Ok((store, session))
}

/// Reads content from `--content` or `--file`. Input that parses as JSON is stored structured,
/// anything else as text.
fn read_content(
    inline: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<Option<RawContent>> {
    let text = match (inline, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => return Ok(None),
    };
    Ok(Some(match serde_json::from_str::<Value>(&text) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => RawContent::Structured(value),
        _ => RawContent::Text(text),
    }))
}

fn parse_references(ids: &[String]) -> anyhow::Result<Option<Vec<DocumentId>>> {
    if ids.is_empty() {
        return Ok(None);
    }
    let parsed = ids
        .iter()
        .map(DocumentId::parse)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(parsed))
}

fn emit<T: serde::Serialize + ?Sized>(format: Format, value: &T) -> anyhow::Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Format::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
