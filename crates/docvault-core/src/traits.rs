//! Capability traits for docvault's external collaborators.
//!
//! The ingestion controller and search aggregator only see these traits, so
//! each backend (PostgreSQL, S3, Elasticsearch, conversion/extraction HTTP
//! services) can be swapped for an in-memory double in tests.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncRead;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::search::BoolQuery;

// =============================================================================
// OBJECT STORE
// =============================================================================

/// Named-blob storage in a single bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stream `reader` to `key` until EOF. `size` is the declared length.
    ///
    /// Returns the number of bytes actually written.
    async fn put(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        size: u64,
        content_type: &str,
    ) -> Result<u64>;

    /// Read a whole blob into memory.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Remove a blob. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Time-bounded signed GET URL for `key`.
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String>;

    /// Create the bucket if it does not exist.
    async fn ensure_bucket(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// METADATA STORE
// =============================================================================

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a document row.
    ///
    /// A duplicate checksum fails with `Error::Conflict`.
    async fn insert(&self, doc: NewDocument) -> Result<Document>;

    /// Fetch a document by id, `Error::NotFound` if absent.
    async fn fetch(&self, id: Uuid) -> Result<Document>;

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Document>>;

    async fn list_by_folder(&self, folder_id: Uuid) -> Result<Vec<Document>>;

    /// Apply a metadata-only patch and return the updated row.
    async fn update(&self, id: Uuid, patch: DocumentPatch) -> Result<Document>;

    /// Record the preview key once a preview has been written.
    async fn set_preview_key(&self, id: Uuid, key: &str) -> Result<()>;

    /// Delete the row. Tag associations cascade.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait FolderRepository: Send + Sync {
    async fn create(&self, tenant_id: Uuid, name: &str, parent_id: Option<Uuid>)
        -> Result<Folder>;

    /// Fetch a folder by id, `Error::NotFound` if absent.
    async fn fetch(&self, id: Uuid) -> Result<Folder>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create(&self, tenant_id: Uuid, name: &str) -> Result<Tag>;

    /// Fetch a tag by id, `Error::NotFound` if absent.
    async fn fetch(&self, id: Uuid) -> Result<Tag>;

    /// Tags attached to a document, ordered by name.
    async fn list_for_document(&self, document_id: Uuid) -> Result<Vec<Tag>>;

    /// Attach a tag. Attaching an existing association is a no-op.
    async fn attach(&self, document_id: Uuid, tag_id: Uuid) -> Result<()>;

    async fn detach(&self, document_id: Uuid, tag_id: Uuid) -> Result<()>;
}

// =============================================================================
// SEARCH INDEX
// =============================================================================

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or overwrite the entry for `doc.document_id`. The entry is
    /// searchable as soon as this returns.
    async fn upsert(&self, doc: &SearchDocument) -> Result<()>;

    async fn query(&self, query: &BoolQuery) -> Result<Vec<SearchHit>>;

    /// Remove the entry for a document. Missing entries are not an error.
    async fn delete(&self, document_id: Uuid) -> Result<()>;

    /// Create the index with its analyzer if it does not exist.
    async fn ensure_index(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// CONVERSION AND EXTRACTION SERVICES
// =============================================================================

#[async_trait]
pub trait PreviewConverter: Send + Sync {
    /// Render `data` (named `file_name`) to PDF bytes.
    async fn convert_to_pdf(
        &self,
        file_name: &str,
        data: Vec<u8>,
        options: &ConversionOptions,
    ) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract plain text from `data`, using `file_name` as a type hint.
    async fn extract_text(&self, file_name: &str, data: Vec<u8>) -> Result<String>;
}
