//! In-memory search index for tests.
//!
//! Evaluates [`BoolQuery`] with simplified semantics: `Term` is exact
//! equality on keyword fields, `Match` succeeds when any lower-cased word
//! of the query occurs in the field. Score is the sum of matched boosts.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use docvault_core::{BoolQuery, Clause, Result, SearchDocument, SearchHit, SearchIndex};

#[derive(Clone, Default)]
pub struct MemorySearchIndex {
    docs: Arc<RwLock<HashMap<Uuid, SearchDocument>>>,
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn keyword(doc: &SearchDocument, field: &str) -> Option<String> {
    match field {
        "document_id" => Some(doc.document_id.to_string()),
        "tenant_id" => Some(doc.tenant_id.to_string()),
        "folder_id" => doc.folder_id.map(|f| f.to_string()),
        "mime_type" => Some(doc.mime_type.clone()),
        _ => None,
    }
}

fn text_field<'a>(doc: &'a SearchDocument, field: &str) -> &'a str {
    match field {
        "name" => &doc.name,
        "text" => &doc.text,
        _ => "",
    }
}

/// Score of a clause against a document, `None` when it does not match.
fn evaluate(doc: &SearchDocument, clause: &Clause) -> Option<f32> {
    match clause {
        Clause::Term { field, value } => (keyword(doc, field).as_deref() == Some(value.as_str()))
            .then_some(1.0),
        Clause::Match {
            field,
            query,
            boost,
        } => {
            let haystack: Vec<String> = words(text_field(doc, field)).collect();
            words(query)
                .any(|w| haystack.contains(&w))
                .then(|| boost.unwrap_or(1.0))
        }
    }
}

impl MemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    pub async fn get(&self, document_id: Uuid) -> Option<SearchDocument> {
        self.docs.read().await.get(&document_id).cloned()
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn upsert(&self, doc: &SearchDocument) -> Result<()> {
        self.docs
            .write()
            .await
            .insert(doc.document_id, doc.clone());
        Ok(())
    }

    async fn query(&self, query: &BoolQuery) -> Result<Vec<SearchHit>> {
        let docs = self.docs.read().await;
        let required = query.minimum_should_match.unwrap_or(0) as usize;

        let mut hits: Vec<SearchHit> = docs
            .values()
            .filter_map(|doc| {
                if !query.must.iter().all(|c| evaluate(doc, c).is_some()) {
                    return None;
                }
                let scores: Vec<f32> = query
                    .should
                    .iter()
                    .filter_map(|c| evaluate(doc, c))
                    .collect();
                if scores.len() < required {
                    return None;
                }
                Some(SearchHit {
                    document_id: doc.document_id,
                    score: scores.iter().sum(),
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(query.size);
        Ok(hits)
    }

    async fn delete(&self, document_id: Uuid) -> Result<()> {
        self.docs.write().await.remove(&document_id);
        Ok(())
    }
}
