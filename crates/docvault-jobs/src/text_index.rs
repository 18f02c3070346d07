//! Text extraction into the search index.
//!
//! Re-running for the same document overwrites its index entry. Empty
//! extractions fail the job so no blank entries are written.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use docvault_core::{
    mime, DocumentRepository, Error, ObjectStore, Result, SearchDocument, SearchIndex,
    TextExtractor,
};

use crate::handler::{JobContext, JobHandler, JobResult, JobType};

pub struct TextIndexHandler {
    documents: Arc<dyn DocumentRepository>,
    objects: Arc<dyn ObjectStore>,
    extractor: Arc<dyn TextExtractor>,
    index: Arc<dyn SearchIndex>,
}

impl TextIndexHandler {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        objects: Arc<dyn ObjectStore>,
        extractor: Arc<dyn TextExtractor>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            documents,
            objects,
            extractor,
            index,
        }
    }

    /// Extract and index one document, returning the indexed text length.
    pub async fn index_document(&self, document_id: Uuid) -> Result<usize> {
        let start = Instant::now();
        let doc = self.documents.fetch(document_id).await?;

        if !mime::is_extractable_text(&doc.mime_type) {
            return Err(Error::Validation(format!(
                "mime type {} does not support text extraction",
                doc.mime_type
            )));
        }

        let data = self.objects.get(&doc.object_key).await?;
        let raw = self.extractor.extract_text(&doc.name, data).await?;
        let text = raw.trim();
        if text.is_empty() {
            return Err(Error::Validation(format!(
                "no text extracted from document {}",
                doc.id
            )));
        }

        let entry = SearchDocument::from_document(&doc, text.to_string());
        self.index.upsert(&entry).await?;

        info!(
            subsystem = "jobs",
            component = "text_index",
            op = "index",
            document_id = %doc.id,
            text_len = text.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Document indexed"
        );
        Ok(text.len())
    }
}

#[async_trait]
impl JobHandler for TextIndexHandler {
    fn job_type(&self) -> JobType {
        JobType::TextIndex
    }

    async fn execute(&self, ctx: JobContext) -> JobResult {
        self.index_document(ctx.document_id())
            .await
            .map(|len| json!({ "text_len": len }))
            .into()
    }
}
