//! The document service and its builder.
//!
//! [`DocumentService`] holds capability handles to the metadata store,
//! object store, optional search index and the background dispatcher. The
//! operations themselves live in sibling modules as `impl` blocks.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use docvault_core::{
    defaults, DocumentRepository, FolderRepository, ObjectStore, PreviewConverter, SearchIndex,
    TagRepository, TextExtractor,
};
use docvault_jobs::{DispatcherConfig, JobDispatcher, JobType, PreviewHandler, TextIndexHandler};

/// Ingestion, search and lifecycle operations over the storage backends.
///
/// Cheap to clone; clones share the same dispatcher.
#[derive(Clone)]
pub struct DocumentService {
    pub(crate) documents: Arc<dyn DocumentRepository>,
    pub(crate) folders: Arc<dyn FolderRepository>,
    pub(crate) tags: Arc<dyn TagRepository>,
    pub(crate) objects: Arc<dyn ObjectStore>,
    pub(crate) search: Option<Arc<dyn SearchIndex>>,
    pub(crate) dispatcher: JobDispatcher,
    pub(crate) presign_ttl: Duration,
}

impl DocumentService {
    pub fn builder(
        documents: Arc<dyn DocumentRepository>,
        folders: Arc<dyn FolderRepository>,
        tags: Arc<dyn TagRepository>,
        objects: Arc<dyn ObjectStore>,
    ) -> DocumentServiceBuilder {
        DocumentServiceBuilder {
            documents,
            folders,
            tags,
            objects,
            search: None,
            converter: None,
            extractor: None,
            dispatcher_config: DispatcherConfig::default(),
            presign_ttl: Duration::from_secs(defaults::PRESIGN_TTL_SECS),
        }
    }

    /// The background dispatcher, for event subscription and shutdown.
    pub fn dispatcher(&self) -> &JobDispatcher {
        &self.dispatcher
    }

    pub fn has_search_index(&self) -> bool {
        self.search.is_some()
    }

    /// Schedule a background job. Failures are logged, never returned.
    pub(crate) fn schedule(&self, job_type: JobType, document_id: Uuid) {
        if let Err(e) = self.dispatcher.submit(job_type, document_id) {
            warn!(
                subsystem = "service",
                component = "dispatch",
                job_type = %job_type,
                document_id = %document_id,
                error = %e,
                "Background job not scheduled"
            );
        }
    }
}

/// Builder for [`DocumentService`].
///
/// The preview handler is registered only with a converter, and the
/// text-index handler only with both an extractor and a search index.
pub struct DocumentServiceBuilder {
    documents: Arc<dyn DocumentRepository>,
    folders: Arc<dyn FolderRepository>,
    tags: Arc<dyn TagRepository>,
    objects: Arc<dyn ObjectStore>,
    search: Option<Arc<dyn SearchIndex>>,
    converter: Option<Arc<dyn PreviewConverter>>,
    extractor: Option<Arc<dyn TextExtractor>>,
    dispatcher_config: DispatcherConfig,
    presign_ttl: Duration,
}

impl DocumentServiceBuilder {
    pub fn with_search_index(mut self, index: Arc<dyn SearchIndex>) -> Self {
        self.search = Some(index);
        self
    }

    pub fn with_converter(mut self, converter: Arc<dyn PreviewConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_dispatcher_config(mut self, config: DispatcherConfig) -> Self {
        self.dispatcher_config = config;
        self
    }

    pub fn with_presign_ttl(mut self, ttl: Duration) -> Self {
        self.presign_ttl = ttl;
        self
    }

    pub fn build(self) -> DocumentService {
        let mut jobs = JobDispatcher::builder().with_config(self.dispatcher_config);

        if let Some(converter) = self.converter {
            jobs = jobs.with_handler(PreviewHandler::new(
                self.documents.clone(),
                self.objects.clone(),
                converter,
            ));
        }
        match (self.extractor, &self.search) {
            (Some(extractor), Some(index)) => {
                jobs = jobs.with_handler(TextIndexHandler::new(
                    self.documents.clone(),
                    self.objects.clone(),
                    extractor,
                    index.clone(),
                ));
            }
            (Some(_), None) => {
                warn!(
                    subsystem = "service",
                    "Extraction service configured without a search index; text indexing disabled"
                );
            }
            _ => {}
        }

        let dispatcher = jobs.build();
        debug!(
            subsystem = "service",
            search_index = self.search.is_some(),
            preview_jobs = dispatcher.has_handler(JobType::Preview),
            text_index_jobs = dispatcher.has_handler(JobType::TextIndex),
            "Document service built"
        );

        DocumentService {
            documents: self.documents,
            folders: self.folders,
            tags: self.tags,
            objects: self.objects,
            search: self.search,
            dispatcher,
            presign_ttl: self.presign_ttl,
        }
    }
}
