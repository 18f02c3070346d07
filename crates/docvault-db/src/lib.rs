//! # docvault-db
//!
//! Metadata store for docvault.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL repositories for documents, folders, tags and their
//!   associations, with the checksum uniqueness constraint surfaced as
//!   `Error::Conflict`
//! - An in-memory store with the same constraints for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use docvault_db::{Database, PoolConfig};
//! use docvault_core::DocumentRepository;
//!
//! let db = Database::connect_with_config(url, PoolConfig::new()).await?;
//! db.migrate().await?;
//! let docs = db.documents.list_by_tenant(tenant_id).await?;
//! ```

pub mod documents;
pub mod folders;
pub mod memory;
pub mod pool;
pub mod tags;
pub mod test_fixtures;

pub use documents::PgDocumentRepository;
pub use folders::PgFolderRepository;
pub use memory::MemoryMetadataStore;
pub use pool::{create_pool_with_config, PoolConfig};
pub use tags::PgTagRepository;

#[cfg(feature = "migrations")]
use docvault_core::Error;
use docvault_core::Result;

/// Aggregates the PostgreSQL repositories over one pool.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub documents: PgDocumentRepository,
    pub folders: PgFolderRepository,
    pub tags: PgTagRepository,
}

impl Database {
    /// Create a Database from an existing pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            documents: PgDocumentRepository::new(pool.clone()),
            folders: PgFolderRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with a custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
