//! Preview and text-index handlers against the in-memory stores.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use docvault_core::{
    ConversionOptions, Document, DocumentPatch, DocumentRepository, Error, NewDocument,
    ObjectStore, PreviewConverter, Result, SearchIndex, TextExtractor,
};
use docvault_db::{test_fixtures::new_document, MemoryMetadataStore};
use docvault_jobs::{
    Job, JobContext, JobDispatcher, JobEvent, JobHandler, JobType, PreviewHandler,
    TextIndexHandler,
};
use docvault_search::MemorySearchIndex;
use docvault_storage::MemoryObjectStore;

const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

// ============================================================================
// STUB SERVICES
// ============================================================================

struct StubConverter;

#[async_trait]
impl PreviewConverter for StubConverter {
    async fn convert_to_pdf(
        &self,
        _file_name: &str,
        data: Vec<u8>,
        _options: &ConversionOptions,
    ) -> Result<Vec<u8>> {
        let mut pdf = b"%PDF-1.7 ".to_vec();
        pdf.extend(data);
        Ok(pdf)
    }
}

struct StubExtractor(&'static str);

#[async_trait]
impl TextExtractor for StubExtractor {
    async fn extract_text(&self, _file_name: &str, _data: Vec<u8>) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Delegates to the memory store but refuses to record preview keys.
struct RejectPreviewKey(MemoryMetadataStore);

#[async_trait]
impl DocumentRepository for RejectPreviewKey {
    async fn insert(&self, doc: NewDocument) -> Result<Document> {
        self.0.insert(doc).await
    }
    async fn fetch(&self, id: Uuid) -> Result<Document> {
        self.0.fetch(id).await
    }
    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Document>> {
        self.0.list_by_tenant(tenant_id).await
    }
    async fn list_by_folder(&self, folder_id: Uuid) -> Result<Vec<Document>> {
        self.0.list_by_folder(folder_id).await
    }
    async fn update(&self, id: Uuid, patch: DocumentPatch) -> Result<Document> {
        self.0.update(id, patch).await
    }
    async fn set_preview_key(&self, _id: Uuid, _key: &str) -> Result<()> {
        Err(Error::Internal("metadata store unavailable".to_string()))
    }
    async fn delete(&self, id: Uuid) -> Result<()> {
        self.0.delete(id).await
    }
}

// ============================================================================
// HELPERS
// ============================================================================

async fn seed(
    meta: &MemoryMetadataStore,
    objects: &MemoryObjectStore,
    name: &str,
    mime_type: &str,
    body: &[u8],
) -> Document {
    let mut doc = new_document(Uuid::new_v4());
    doc.name = name.to_string();
    doc.mime_type = mime_type.to_string();
    doc.file_size = body.len() as i64;
    let mut reader = body;
    objects
        .put(&doc.object_key, &mut reader, body.len() as u64, mime_type)
        .await
        .unwrap();
    meta.insert(doc).await.unwrap()
}

// ============================================================================
// PREVIEW
// ============================================================================

#[tokio::test]
async fn test_preview_written_and_recorded() {
    let meta = MemoryMetadataStore::new();
    let objects = MemoryObjectStore::new();
    let doc = seed(&meta, &objects, "report.docx", DOCX, b"docx-bytes").await;

    let handler = PreviewHandler::new(
        Arc::new(meta.clone()),
        Arc::new(objects.clone()),
        Arc::new(StubConverter),
    );
    let key = handler.generate(doc.id).await.unwrap();

    assert!(key.starts_with(&format!("{}/previews/", doc.tenant_id)));
    assert!(key.ends_with(".pdf"));
    let stored = objects.object(&key).await.unwrap();
    assert_eq!(stored.content_type, "application/pdf");
    assert!(stored.data.starts_with(b"%PDF"));

    let reloaded = meta.fetch(doc.id).await.unwrap();
    assert_eq!(reloaded.preview_key.as_deref(), Some(key.as_str()));
}

#[tokio::test]
async fn test_preview_rejects_html() {
    let meta = MemoryMetadataStore::new();
    let objects = MemoryObjectStore::new();
    let doc = seed(&meta, &objects, "page.txt", "text/html", b"<p>hi</p>").await;

    let handler = PreviewHandler::new(
        Arc::new(meta.clone()),
        Arc::new(objects.clone()),
        Arc::new(StubConverter),
    );
    let err = handler.generate(doc.id).await.unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(objects.object_count().await, 1);
    assert!(meta.fetch(doc.id).await.unwrap().preview_key.is_none());
}

#[tokio::test]
async fn test_preview_removed_when_key_not_recorded() {
    let meta = MemoryMetadataStore::new();
    let objects = MemoryObjectStore::new();
    let doc = seed(&meta, &objects, "report.docx", DOCX, b"docx-bytes").await;

    let handler = PreviewHandler::new(
        Arc::new(RejectPreviewKey(meta.clone())),
        Arc::new(objects.clone()),
        Arc::new(StubConverter),
    );
    assert!(handler.generate(doc.id).await.is_err());

    assert_eq!(objects.keys().await, vec![doc.object_key.clone()]);
}

#[tokio::test]
async fn test_preview_missing_document() {
    let handler = PreviewHandler::new(
        Arc::new(MemoryMetadataStore::new()),
        Arc::new(MemoryObjectStore::new()),
        Arc::new(StubConverter),
    );
    let result = handler
        .execute(JobContext::new(Job::new(JobType::Preview, Uuid::new_v4())))
        .await;
    assert!(!result.is_success());
}

// ============================================================================
// TEXT INDEX
// ============================================================================

#[tokio::test]
async fn test_text_indexed_trimmed() {
    let meta = MemoryMetadataStore::new();
    let objects = MemoryObjectStore::new();
    let index = MemorySearchIndex::new();
    let doc = seed(&meta, &objects, "notes.txt", "text/plain", b"quarterly").await;

    let handler = TextIndexHandler::new(
        Arc::new(meta.clone()),
        Arc::new(objects.clone()),
        Arc::new(StubExtractor("  quarterly report  \n")),
        Arc::new(index.clone()),
    );
    assert_eq!(handler.index_document(doc.id).await.unwrap(), 16);

    let entry = index.get(doc.id).await.unwrap();
    assert_eq!(entry.text, "quarterly report");
    assert_eq!(entry.name, "notes.txt");
    assert_eq!(entry.tenant_id, doc.tenant_id);
}

#[tokio::test]
async fn test_empty_extraction_not_indexed() {
    let meta = MemoryMetadataStore::new();
    let objects = MemoryObjectStore::new();
    let index = MemorySearchIndex::new();
    let doc = seed(&meta, &objects, "scan.png", "image/png", b"png").await;

    let handler = TextIndexHandler::new(
        Arc::new(meta.clone()),
        Arc::new(objects.clone()),
        Arc::new(StubExtractor("   \n\t")),
        Arc::new(index.clone()),
    );
    assert!(handler.index_document(doc.id).await.is_err());
    assert!(index.is_empty().await);
}

#[tokio::test]
async fn test_reindex_overwrites_entry() {
    let meta = MemoryMetadataStore::new();
    let objects = MemoryObjectStore::new();
    let index = MemorySearchIndex::new();
    let doc = seed(&meta, &objects, "notes.txt", "text/plain", b"v1").await;

    for text in ["first draft", "final version"] {
        TextIndexHandler::new(
            Arc::new(meta.clone()),
            Arc::new(objects.clone()),
            Arc::new(StubExtractor(text)),
            Arc::new(index.clone()),
        )
        .index_document(doc.id)
        .await
        .unwrap();
    }

    assert_eq!(index.len().await, 1);
    assert_eq!(index.get(doc.id).await.unwrap().text, "final version");
}

#[tokio::test]
async fn test_video_not_extractable() {
    let meta = MemoryMetadataStore::new();
    let objects = MemoryObjectStore::new();
    let doc = seed(&meta, &objects, "clip.mp4", "video/mp4", b"mp4").await;

    let handler = TextIndexHandler::new(
        Arc::new(meta.clone()),
        Arc::new(objects.clone()),
        Arc::new(StubExtractor("never")),
        Arc::new(MemorySearchIndex::new()),
    );
    let err = handler.index_document(doc.id).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

// ============================================================================
// THROUGH THE DISPATCHER
// ============================================================================

#[tokio::test]
async fn test_dispatched_jobs_derive_artifacts() {
    let meta = MemoryMetadataStore::new();
    let objects = MemoryObjectStore::new();
    let index = MemorySearchIndex::new();
    let doc = seed(&meta, &objects, "report.docx", DOCX, b"docx-bytes").await;

    let documents: Arc<dyn DocumentRepository> = Arc::new(meta.clone());
    let store: Arc<dyn ObjectStore> = Arc::new(objects.clone());
    let search: Arc<dyn SearchIndex> = Arc::new(index.clone());
    let dispatcher = JobDispatcher::builder()
        .with_handler(PreviewHandler::new(
            documents.clone(),
            store.clone(),
            Arc::new(StubConverter),
        ))
        .with_handler(TextIndexHandler::new(
            documents,
            store,
            Arc::new(StubExtractor("annual report")),
            search,
        ))
        .build();
    let mut events = dispatcher.events();

    dispatcher.submit(JobType::Preview, doc.id).unwrap();
    dispatcher.submit(JobType::TextIndex, doc.id).unwrap();
    dispatcher.wait_idle().await;

    let mut completed = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, JobEvent::Completed { .. }) {
            completed += 1;
        }
    }
    assert_eq!(completed, 2);
    assert!(meta.fetch(doc.id).await.unwrap().preview_key.is_some());
    assert_eq!(index.get(doc.id).await.unwrap().text, "annual report");
}
