//! docvault: command-line front end for document ingestion and search.
//!
//! Results are printed to stdout as JSON; logs go to stderr (or `LOG_FILE`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use docvault_core::{
    DocumentRepository, FolderRepository, ObjectStore, SearchIndex, SearchRequest, TagRepository,
    UpdateDocumentRequest, UploadRequest,
};
use docvault_db::{Database, PoolConfig};
use docvault_jobs::{DocdClient, GotenbergClient};
use docvault_search::ElasticsearchIndex;
use docvault_service::{Config, DocumentService};
use docvault_storage::S3ObjectStore;

#[derive(Parser)]
#[command(name = "docvault")]
#[command(author, version, about = "Document ingestion and search")]
#[command(propagate_version = true)]
struct Cli {
    /// Tenant the command acts on
    #[arg(long, env = "DOCVAULT_TENANT", global = true)]
    tenant: Option<Uuid>,

    /// Identity recorded as uploader/updater
    #[arg(long, env = "DOCVAULT_USER", global = true)]
    user: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations and create the bucket and search index if missing
    Init,

    /// Upload a file
    Upload {
        /// File to upload
        path: PathBuf,

        /// Declared mime type
        #[arg(short, long)]
        mime_type: String,

        /// Display name (default: the file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Target folder
        #[arg(short, long)]
        folder: Option<Uuid>,

        /// Counterparty the document came from
        #[arg(short, long)]
        sender: Option<Uuid>,

        /// Return without waiting for preview and indexing jobs
        #[arg(long)]
        no_wait: bool,
    },

    /// Show a document with tags and access URLs
    Get { id: Uuid },

    /// Browse or full-text search documents
    Search {
        /// Full-text query; omit to browse
        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long)]
        folder: Option<Uuid>,

        /// Required tag (repeatable; all must match)
        #[arg(short, long = "tag")]
        tags: Vec<Uuid>,
    },

    /// Rename, move or reassign a document
    Update {
        id: Uuid,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        folder: Option<Uuid>,

        #[arg(short, long)]
        sender: Option<Uuid>,
    },

    /// Delete a document and its blobs
    Delete { id: Uuid },

    /// Re-extract text and overwrite the search entry
    Reindex { id: Uuid },

    /// Manage document tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },
}

#[derive(Subcommand)]
enum TagAction {
    /// Attach a tag to a document
    Add { document: Uuid, tag: Uuid },
    /// Detach a tag from a document
    Remove { document: Uuid, tag: Uuid },
    /// List a document's tags
    List { document: Uuid },
}

/// Connected backends plus the service built over them.
struct Runtime {
    service: DocumentService,
    db: Database,
    objects: Arc<S3ObjectStore>,
    index: Option<Arc<ElasticsearchIndex>>,
}

async fn connect(config: &Config) -> anyhow::Result<Runtime> {
    let db = Database::connect_with_config(
        &config.database_url,
        PoolConfig::new().max_connections(config.database_max_connections),
    )
    .await
    .context("connecting to database")?;
    let objects = Arc::new(S3ObjectStore::connect(&config.s3).await);

    let documents: Arc<dyn DocumentRepository> = Arc::new(db.documents.clone());
    let folders: Arc<dyn FolderRepository> = Arc::new(db.folders.clone());
    let tags: Arc<dyn TagRepository> = Arc::new(db.tags.clone());
    let store: Arc<dyn ObjectStore> = objects.clone();

    let mut builder = DocumentService::builder(documents, folders, tags, store)
        .with_dispatcher_config(config.dispatcher.clone());

    let index = match &config.elasticsearch {
        Some(es) => Some(Arc::new(ElasticsearchIndex::new(es.clone())?)),
        None => None,
    };
    if let Some(index) = &index {
        let search: Arc<dyn SearchIndex> = index.clone();
        builder = builder.with_search_index(search);
    }
    if let Some(url) = &config.gotenberg_url {
        let converter = GotenbergClient::new(url).with_timeout(config.gotenberg_timeout);
        builder = builder.with_converter(Arc::new(converter));
    }
    if let Some(url) = &config.docd_url {
        builder = builder.with_extractor(Arc::new(DocdClient::new(url)));
    }

    Ok(Runtime {
        service: builder.build(),
        db,
        objects,
        index,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli, rt: &Runtime) -> anyhow::Result<()> {
    let tenant = || cli.tenant.context("--tenant (or DOCVAULT_TENANT) is required");
    let service = &rt.service;

    match &cli.command {
        Commands::Init => {
            rt.db.migrate().await.context("running migrations")?;
            rt.objects.ensure_bucket().await?;
            if let Some(index) = &rt.index {
                index.ensure_index().await?;
            }
            info!(
                bucket = rt.objects.bucket(),
                search_index = rt.index.as_ref().map(|i| i.index_name()).unwrap_or("(none)"),
                "Backends initialized"
            );
        }
        Commands::Upload {
            path,
            mime_type,
            name,
            folder,
            sender,
            no_wait,
        } => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            let size = file.metadata().await?.len();
            let name = match name {
                Some(name) => name.clone(),
                None => path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .context("file name is not valid UTF-8")?
                    .to_string(),
            };
            let request = UploadRequest {
                tenant_id: tenant()?,
                folder_id: *folder,
                name,
                size,
                mime_type: mime_type.clone(),
                sender_id: *sender,
                uploaded_by: cli.user,
            };
            let doc = service.upload(request, file).await?;
            print_json(&doc)?;
            if !no_wait {
                service.dispatcher().wait_idle().await;
            }
        }
        Commands::Get { id } => {
            print_json(&service.get_document(tenant()?, *id).await?)?;
        }
        Commands::Search {
            query,
            folder,
            tags,
        } => {
            let request = SearchRequest {
                tenant_id: tenant()?,
                folder_id: *folder,
                query: query.clone(),
                tag_ids: tags.clone(),
            };
            print_json(&service.search(&request).await?)?;
        }
        Commands::Update {
            id,
            name,
            folder,
            sender,
        } => {
            let request = UpdateDocumentRequest {
                name: name.clone(),
                folder_id: *folder,
                sender_id: *sender,
                updated_by: cli.user,
            };
            print_json(&service.update_document(tenant()?, *id, request).await?)?;
        }
        Commands::Delete { id } => {
            service.delete_document(tenant()?, *id).await?;
            print_json(&serde_json::json!({ "deleted": id }))?;
        }
        Commands::Reindex { id } => {
            let job_id = service.reindex_document(tenant()?, *id).await?;
            service.dispatcher().wait_idle().await;
            print_json(&serde_json::json!({ "document_id": id, "job_id": job_id }))?;
        }
        Commands::Tag { action } => match action {
            TagAction::Add { document, tag } => {
                service.add_tag(tenant()?, *document, *tag).await?;
                print_json(&service.list_tags(tenant()?, *document).await?)?;
            }
            TagAction::Remove { document, tag } => {
                service.remove_tag(tenant()?, *document, *tag).await?;
                print_json(&service.list_tags(tenant()?, *document).await?)?;
            }
            TagAction::List { document } => {
                print_json(&service.list_tags(tenant()?, *document).await?)?;
            }
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "docvault=info")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "docvault=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("docvault.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // stdout carries command output
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let rt = connect(&config).await?;

    let result = run(cli, &rt).await;
    rt.service.dispatcher().shutdown().await;
    result
}
