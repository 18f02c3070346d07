//! Ingestion: validation, content-addressed upload and job scheduling.
//!
//! The blob is written first and the metadata row second. Every failure
//! after the blob write removes the blob before the error is returned, so a
//! rejected upload never leaves an unreachable object behind.

use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{error, info};
use uuid::Uuid;

use docvault_core::{
    keys, mime, validate_upload, ChecksumReader, Document, Error, NewDocument, Result,
    UploadRequest,
};
use docvault_jobs::JobType;

use crate::service::DocumentService;

impl DocumentService {
    /// Store a new document from `reader`, which must yield exactly
    /// `request.size` bytes.
    ///
    /// Returns as soon as the metadata row exists. Preview and text-index
    /// jobs are scheduled in the background when the mime type qualifies.
    pub async fn upload<R>(&self, request: UploadRequest, reader: R) -> Result<Document>
    where
        R: AsyncRead + Send + Unpin,
    {
        let start = Instant::now();
        let ext = validate_upload(&request.name, &request.mime_type, request.size)?;
        if let Some(folder_id) = request.folder_id {
            self.check_folder(request.tenant_id, folder_id).await?;
        }

        let object_key = keys::object_key(request.tenant_id, &ext);

        // One extra byte lets an oversized stream be detected without
        // reading it to the end.
        let mut hashing = ChecksumReader::new(reader.take(request.size + 1));
        self.objects
            .put(&object_key, &mut hashing, request.size, &request.mime_type)
            .await?;
        let (checksum, received) = hashing.finish();

        if received != request.size {
            self.discard_blob(&object_key).await;
            return Err(Error::Validation(format!(
                "declared size {} does not match received size {}",
                request.size, received
            )));
        }

        let new_doc = NewDocument {
            id: Uuid::now_v7(),
            tenant_id: request.tenant_id,
            folder_id: request.folder_id,
            name: request.name,
            object_key: object_key.clone(),
            file_size: request.size as i64,
            mime_type: request.mime_type,
            checksum,
            sender_id: request.sender_id,
            created_by: request.uploaded_by,
        };

        let doc = match self.documents.insert(new_doc).await {
            Ok(doc) => doc,
            Err(Error::Conflict(msg)) => {
                self.discard_blob(&object_key).await;
                return Err(Error::Conflict(msg));
            }
            Err(e) => {
                self.discard_blob(&object_key).await;
                return Err(Error::Storage(format!("failed to record document: {}", e)));
            }
        };

        let preview = mime::is_convertible_to_pdf(&doc.mime_type);
        let text_index = mime::is_extractable_text(&doc.mime_type);
        if preview {
            self.schedule(JobType::Preview, doc.id);
        }
        if text_index {
            self.schedule(JobType::TextIndex, doc.id);
        }

        info!(
            subsystem = "service",
            component = "ingest",
            op = "upload",
            document_id = %doc.id,
            tenant_id = %doc.tenant_id,
            object_key = %doc.object_key,
            byte_count = doc.file_size,
            preview,
            text_index,
            duration_ms = start.elapsed().as_millis() as u64,
            "Document ingested"
        );
        Ok(doc)
    }

    /// Reject a folder that does not belong to `tenant_id`.
    pub(crate) async fn check_folder(&self, tenant_id: Uuid, folder_id: Uuid) -> Result<()> {
        let folder = self.folders.fetch(folder_id).await?;
        if folder.tenant_id != tenant_id {
            return Err(Error::Validation(format!(
                "folder {} belongs to another tenant",
                folder_id
            )));
        }
        Ok(())
    }

    /// Compensating delete of a blob whose metadata was never written.
    async fn discard_blob(&self, object_key: &str) {
        if let Err(e) = self.objects.remove(object_key).await {
            error!(
                subsystem = "service",
                component = "ingest",
                op = "compensate",
                object_key,
                error = %e,
                "Failed to remove rejected upload"
            );
        }
    }
}
