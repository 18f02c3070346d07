//! Browse and full-text search.
//!
//! With a text query, hits come from the search index and are hydrated from
//! the metadata store; ids that no longer resolve are skipped. Without one,
//! documents are listed straight from the metadata store. Tag filtering and
//! enrichment are applied the same way in both modes.

use std::collections::HashSet;
use std::time::Instant;

use futures::future::try_join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use docvault_core::{BoolQuery, Document, DocumentView, Error, Result, SearchRequest};

use crate::service::DocumentService;

impl DocumentService {
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<DocumentView>> {
        let start = Instant::now();

        let mut candidates = match request.text_query() {
            Some(text) => {
                self.full_text(request.tenant_id, request.folder_id, text)
                    .await?
            }
            None => match request.folder_id {
                Some(folder_id) => self.documents.list_by_folder(folder_id).await?,
                None => self.documents.list_by_tenant(request.tenant_id).await?,
            },
        };
        // A folder id from another tenant must not widen the result set.
        candidates.retain(|d| d.tenant_id == request.tenant_id);
        let candidate_count = candidates.len();

        let docs = self.filter_by_tags(candidates, &request.tag_ids).await?;
        let views = try_join_all(docs.into_iter().map(|doc| self.enrich(doc))).await?;

        debug!(
            subsystem = "service",
            component = "search",
            op = "search",
            tenant_id = %request.tenant_id,
            full_text = request.text_query().is_some(),
            candidate_count,
            result_count = views.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search completed"
        );
        Ok(views)
    }

    async fn full_text(
        &self,
        tenant_id: Uuid,
        folder_id: Option<Uuid>,
        text: &str,
    ) -> Result<Vec<Document>> {
        let index = self.search.as_ref().ok_or_else(|| {
            Error::DependencyUnavailable("search index is not configured".to_string())
        })?;

        let hits = index
            .query(&BoolQuery::documents(tenant_id, folder_id, text))
            .await?;

        let mut docs = Vec::with_capacity(hits.len());
        for hit in hits {
            match self.documents.fetch(hit.document_id).await {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    warn!(
                        subsystem = "service",
                        component = "search",
                        document_id = %hit.document_id,
                        error = %e,
                        "Skipping search hit missing from metadata store"
                    );
                }
            }
        }
        Ok(docs)
    }

    /// Keep documents carrying every tag in `tag_ids`.
    async fn filter_by_tags(&self, docs: Vec<Document>, tag_ids: &[Uuid]) -> Result<Vec<Document>> {
        if tag_ids.is_empty() {
            return Ok(docs);
        }
        let wanted: HashSet<Uuid> = tag_ids.iter().copied().collect();

        let mut kept = Vec::new();
        for doc in docs {
            let have: HashSet<Uuid> = self
                .tags
                .list_for_document(doc.id)
                .await?
                .into_iter()
                .map(|t| t.id)
                .collect();
            if wanted.is_subset(&have) {
                kept.push(doc);
            }
        }
        Ok(kept)
    }

    /// Attach tags and short-lived access URLs.
    ///
    /// A URL that cannot be signed is left empty so one bad object does not
    /// fail a whole listing.
    pub(crate) async fn enrich(&self, document: Document) -> Result<DocumentView> {
        let tags = self.tags.list_for_document(document.id).await?;
        let download_url = self.signed_url(document.id, &document.object_key).await;
        let preview_url = match document.preview_key.as_deref() {
            Some(key) => self.signed_url(document.id, key).await,
            None => String::new(),
        };
        Ok(DocumentView {
            document,
            tags,
            preview_url,
            download_url,
        })
    }

    async fn signed_url(&self, document_id: Uuid, key: &str) -> String {
        match self.objects.presign_get(key, self.presign_ttl).await {
            Ok(url) => url,
            Err(e) => {
                warn!(
                    subsystem = "service",
                    component = "search",
                    document_id = %document_id,
                    object_key = key,
                    error = %e,
                    "Failed to sign access URL"
                );
                String::new()
            }
        }
    }
}
