//! Shared harness: a document service over the in-memory backends with
//! stub conversion and extraction services.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use docvault_core::{
    ConversionOptions, Document, FolderRepository, PreviewConverter, Result, TagRepository,
    TextExtractor, UploadRequest,
};
use docvault_db::MemoryMetadataStore;
use docvault_search::MemorySearchIndex;
use docvault_service::{DocumentService, DocumentServiceBuilder};
use docvault_storage::MemoryObjectStore;

pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Wraps the input in a fake PDF header.
pub struct StubConverter;

#[async_trait]
impl PreviewConverter for StubConverter {
    async fn convert_to_pdf(
        &self,
        _file_name: &str,
        data: Vec<u8>,
        _options: &ConversionOptions,
    ) -> Result<Vec<u8>> {
        let mut pdf = b"%PDF-1.7\n".to_vec();
        pdf.extend(data);
        Ok(pdf)
    }
}

/// Treats the blob as UTF-8 text.
pub struct StubExtractor;

#[async_trait]
impl TextExtractor for StubExtractor {
    async fn extract_text(&self, _file_name: &str, data: Vec<u8>) -> Result<String> {
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

pub struct Harness {
    pub service: DocumentService,
    pub meta: MemoryMetadataStore,
    pub objects: MemoryObjectStore,
    pub index: MemorySearchIndex,
    pub tenant: Uuid,
}

impl Harness {
    /// Fully wired: search index, converter and extractor.
    pub fn new() -> Self {
        Self::with(|b, index| {
            b.with_search_index(index)
                .with_converter(Arc::new(StubConverter))
                .with_extractor(Arc::new(StubExtractor))
        })
    }

    /// No search index, no background services.
    pub fn bare() -> Self {
        Self::with(|b, _| b)
    }

    pub fn with<F>(configure: F) -> Self
    where
        F: FnOnce(DocumentServiceBuilder, Arc<MemorySearchIndex>) -> DocumentServiceBuilder,
    {
        let meta = MemoryMetadataStore::new();
        let objects = MemoryObjectStore::new();
        let index = MemorySearchIndex::new();

        let builder = DocumentService::builder(
            Arc::new(meta.clone()),
            Arc::new(meta.clone()),
            Arc::new(meta.clone()),
            Arc::new(objects.clone()),
        );
        let service = configure(builder, Arc::new(index.clone())).build();

        Self {
            service,
            meta,
            objects,
            index,
            tenant: Uuid::new_v4(),
        }
    }

    pub fn request(&self, name: &str, mime_type: &str, body: &[u8]) -> UploadRequest {
        UploadRequest {
            tenant_id: self.tenant,
            folder_id: None,
            name: name.to_string(),
            size: body.len() as u64,
            mime_type: mime_type.to_string(),
            sender_id: None,
            uploaded_by: None,
        }
    }

    /// Upload and wait for background jobs to finish.
    pub async fn upload(&self, name: &str, mime_type: &str, body: &[u8]) -> Document {
        let doc = self
            .service
            .upload(self.request(name, mime_type, body), body)
            .await
            .expect("upload should succeed");
        self.service.dispatcher().wait_idle().await;
        doc
    }

    pub async fn folder(&self, tenant: Uuid, name: &str) -> Uuid {
        FolderRepository::create(&self.meta, tenant, name, None)
            .await
            .unwrap()
            .id
    }

    pub async fn tag(&self, tenant: Uuid, name: &str) -> Uuid {
        TagRepository::create(&self.meta, tenant, name)
            .await
            .unwrap()
            .id
    }
}
