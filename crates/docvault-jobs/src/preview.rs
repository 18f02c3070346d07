//! PDF preview generation.
//!
//! Reads the original blob, renders it through the conversion service,
//! stores the PDF under `{tenant}/previews/` and records the key on the
//! document. If recording the key fails the new preview blob is removed.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use docvault_core::{
    keys, mime, ConversionOptions, DocumentRepository, Error, ObjectStore, PreviewConverter, Result,
};

use crate::handler::{JobContext, JobHandler, JobResult, JobType};

const PDF_CONTENT_TYPE: &str = "application/pdf";

pub struct PreviewHandler {
    documents: Arc<dyn DocumentRepository>,
    objects: Arc<dyn ObjectStore>,
    converter: Arc<dyn PreviewConverter>,
    options: ConversionOptions,
}

impl PreviewHandler {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        objects: Arc<dyn ObjectStore>,
        converter: Arc<dyn PreviewConverter>,
    ) -> Self {
        Self {
            documents,
            objects,
            converter,
            options: ConversionOptions::default(),
        }
    }

    /// Generate and attach a preview, returning the preview key.
    pub async fn generate(&self, document_id: Uuid) -> Result<String> {
        let start = Instant::now();
        let doc = self.documents.fetch(document_id).await?;

        if !mime::is_convertible_to_pdf(&doc.mime_type) {
            return Err(Error::Validation(format!(
                "mime type {} is not convertible to PDF",
                doc.mime_type
            )));
        }
        if !mime::is_office_document(&doc.mime_type) {
            return Err(Error::Validation(format!(
                "unsupported conversion for mime type {}",
                doc.mime_type
            )));
        }

        let original = self.objects.get(&doc.object_key).await?;
        let pdf = self
            .converter
            .convert_to_pdf(keys::base_name(&doc.object_key), original, &self.options)
            .await?;

        let preview_key = keys::preview_key(doc.tenant_id);
        let mut reader: &[u8] = &pdf;
        self.objects
            .put(&preview_key, &mut reader, pdf.len() as u64, PDF_CONTENT_TYPE)
            .await?;

        if let Err(err) = self.documents.set_preview_key(doc.id, &preview_key).await {
            if let Err(cleanup_err) = self.objects.remove(&preview_key).await {
                warn!(
                    subsystem = "jobs",
                    component = "preview",
                    op = "cleanup",
                    document_id = %doc.id,
                    object_key = %preview_key,
                    error = %cleanup_err,
                    "Failed to remove orphaned preview"
                );
            }
            return Err(err);
        }

        info!(
            subsystem = "jobs",
            component = "preview",
            op = "generate",
            document_id = %doc.id,
            object_key = %preview_key,
            byte_count = pdf.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Preview generated"
        );
        Ok(preview_key)
    }
}

#[async_trait]
impl JobHandler for PreviewHandler {
    fn job_type(&self) -> JobType {
        JobType::Preview
    }

    async fn execute(&self, ctx: JobContext) -> JobResult {
        self.generate(ctx.document_id())
            .await
            .map(|key| json!({ "preview_key": key }))
            .into()
    }
}
