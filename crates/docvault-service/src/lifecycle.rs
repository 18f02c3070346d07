//! Read, update and delete of existing documents.
//!
//! All operations are tenant-scoped: a document owned by another tenant is
//! reported as `NotFound`.

use tracing::{info, warn};
use uuid::Uuid;

use docvault_core::{
    mime, Document, DocumentPatch, DocumentView, Error, Result, UpdateDocumentRequest,
};
use docvault_jobs::JobType;

use crate::service::DocumentService;

impl DocumentService {
    pub(crate) async fn fetch_owned(&self, tenant_id: Uuid, id: Uuid) -> Result<Document> {
        let doc = self.documents.fetch(id).await?;
        if doc.tenant_id != tenant_id {
            return Err(Error::NotFound(format!("document {}", id)));
        }
        Ok(doc)
    }

    /// Document with tags and access URLs. A missing preview yields an
    /// empty preview URL.
    pub async fn get_document(&self, tenant_id: Uuid, id: Uuid) -> Result<DocumentView> {
        let doc = self.fetch_owned(tenant_id, id).await?;
        self.enrich(doc).await
    }

    pub async fn download_url(&self, tenant_id: Uuid, id: Uuid) -> Result<String> {
        let doc = self.fetch_owned(tenant_id, id).await?;
        self.objects
            .presign_get(&doc.object_key, self.presign_ttl)
            .await
    }

    /// Signed preview URL, or an empty string when no preview exists yet.
    pub async fn preview_url(&self, tenant_id: Uuid, id: Uuid) -> Result<String> {
        let doc = self.fetch_owned(tenant_id, id).await?;
        match doc.preview_key {
            Some(key) => self.objects.presign_get(&key, self.presign_ttl).await,
            None => Ok(String::new()),
        }
    }

    /// Rename, move or reassign the sender of a document.
    ///
    /// Metadata only: blobs are not touched and the search entry is not
    /// refreshed.
    pub async fn update_document(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        request: UpdateDocumentRequest,
    ) -> Result<Document> {
        let doc = self.fetch_owned(tenant_id, id).await?;

        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(Error::Validation("document name cannot be empty".to_string()));
            }
        }
        if let Some(folder_id) = request.folder_id {
            self.check_folder(doc.tenant_id, folder_id).await?;
        }

        let updated = self
            .documents
            .update(
                doc.id,
                DocumentPatch {
                    name: request.name,
                    folder_id: request.folder_id,
                    sender_id: request.sender_id,
                    updated_by: request.updated_by,
                },
            )
            .await?;

        info!(
            subsystem = "service",
            component = "lifecycle",
            op = "update",
            document_id = %updated.id,
            tenant_id = %updated.tenant_id,
            "Document updated"
        );
        Ok(updated)
    }

    /// Delete a document and its blobs.
    ///
    /// Failing to remove the original aborts with the metadata intact. The
    /// preview blob and search entry are removed best-effort.
    pub async fn delete_document(&self, tenant_id: Uuid, id: Uuid) -> Result<()> {
        let doc = self.fetch_owned(tenant_id, id).await?;

        self.objects.remove(&doc.object_key).await?;

        if let Some(preview_key) = &doc.preview_key {
            if let Err(e) = self.objects.remove(preview_key).await {
                warn!(
                    subsystem = "service",
                    component = "lifecycle",
                    op = "delete",
                    document_id = %doc.id,
                    object_key = %preview_key,
                    error = %e,
                    "Failed to remove preview blob"
                );
            }
        }

        self.documents.delete(doc.id).await?;

        if let Some(index) = &self.search {
            if let Err(e) = index.delete(doc.id).await {
                warn!(
                    subsystem = "service",
                    component = "lifecycle",
                    op = "delete",
                    document_id = %doc.id,
                    error = %e,
                    "Failed to remove search entry"
                );
            }
        }

        info!(
            subsystem = "service",
            component = "lifecycle",
            op = "delete",
            document_id = %doc.id,
            tenant_id = %doc.tenant_id,
            "Document deleted"
        );
        Ok(())
    }

    /// Schedule a fresh text extraction, overwriting the search entry.
    ///
    /// Returns the background job id.
    pub async fn reindex_document(&self, tenant_id: Uuid, id: Uuid) -> Result<Uuid> {
        let doc = self.fetch_owned(tenant_id, id).await?;

        if !self.dispatcher.has_handler(JobType::TextIndex) {
            return Err(Error::DependencyUnavailable(
                "text indexing is not configured".to_string(),
            ));
        }
        if !mime::is_extractable_text(&doc.mime_type) {
            return Err(Error::Validation(format!(
                "mime type {} does not support text extraction",
                doc.mime_type
            )));
        }

        self.dispatcher.submit(JobType::TextIndex, doc.id)
    }
}
