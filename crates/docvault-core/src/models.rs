//! Domain models for docvault.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// DOCUMENT
// =============================================================================

/// A stored document: the authoritative metadata row for one uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub name: String,
    /// Primary object key. Set at creation, never changes.
    pub object_key: String,
    /// Absent until preview generation succeeds.
    pub preview_key: Option<String>,
    pub file_size: i64,
    pub mime_type: String,
    /// Lower-case hex SHA-256 of the content. Unique across the store.
    pub checksum: String,
    pub sender_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new document row.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub name: String,
    pub object_key: String,
    pub file_size: i64,
    pub mime_type: String,
    pub checksum: String,
    pub sender_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

/// Metadata-only patch applied by a document update.
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub name: Option<String>,
    pub folder_id: Option<Uuid>,
    pub sender_id: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

/// Document enriched for presentation: tags plus short-lived access URLs.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    #[serde(flatten)]
    pub document: Document,
    pub tags: Vec<Tag>,
    /// Empty when no preview exists.
    pub preview_url: String,
    pub download_url: String,
}

// =============================================================================
// FOLDERS AND TAGS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Everything about an upload except the byte stream itself.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub tenant_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub name: String,
    /// Declared byte size of the stream.
    pub size: u64,
    pub mime_type: String,
    pub sender_id: Option<Uuid>,
    pub uploaded_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocumentRequest {
    pub name: Option<String>,
    pub folder_id: Option<Uuid>,
    pub sender_id: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

/// Browse/search request. An empty or whitespace-only query browses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub tenant_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub query: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

impl SearchRequest {
    pub fn browse(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            ..Default::default()
        }
    }

    /// Trimmed query text, or `None` when absent or blank.
    pub fn text_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

// =============================================================================
// SEARCH INDEX PROJECTION
// =============================================================================

/// Denormalized projection of a document held in the full-text index.
///
/// Keyed by `document_id`; re-indexing overwrites the prior entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub document_id: Uuid,
    pub tenant_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub name: String,
    pub text: String,
    pub mime_type: String,
    pub file_size: i64,
    pub indexed_at: DateTime<Utc>,
}

impl SearchDocument {
    pub fn from_document(document: &Document, text: String) -> Self {
        Self {
            document_id: document.id,
            tenant_id: document.tenant_id,
            folder_id: document.folder_id,
            name: document.name.clone(),
            text,
            mime_type: document.mime_type.clone(),
            file_size: document.file_size,
            indexed_at: Utc::now(),
        }
    }
}

/// A single hit returned by the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: Uuid,
    pub score: f32,
}

// =============================================================================
// CONVERSION
// =============================================================================

/// Options passed to the conversion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    pub landscape: bool,
    pub single_page_sheets: bool,
    pub output_name: String,
}

impl Default for ConversionOptions {
    /// Portrait orientation with each sheet flattened to one page.
    fn default() -> Self {
        Self {
            landscape: false,
            single_page_sheets: true,
            output_name: crate::defaults::PREVIEW_OUTPUT_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_query_blank_is_browse() {
        let mut req = SearchRequest::browse(Uuid::nil());
        assert_eq!(req.text_query(), None);
        req.query = Some("   ".to_string());
        assert_eq!(req.text_query(), None);
        req.query = Some("  invoice ".to_string());
        assert_eq!(req.text_query(), Some("invoice"));
    }

    #[test]
    fn test_conversion_defaults() {
        let opts = ConversionOptions::default();
        assert!(!opts.landscape);
        assert!(opts.single_page_sheets);
        assert_eq!(opts.output_name, "preview");
    }

    #[test]
    fn test_document_view_flattens_document() {
        let now = Utc::now();
        let doc = Document {
            id: Uuid::nil(),
            tenant_id: Uuid::nil(),
            folder_id: None,
            name: "a.txt".to_string(),
            object_key: "t/a.txt".to_string(),
            preview_key: None,
            file_size: 10,
            mime_type: "text/plain".to_string(),
            checksum: "00".to_string(),
            sender_id: None,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        let view = DocumentView {
            document: doc,
            tags: vec![],
            preview_url: String::new(),
            download_url: "http://x".to_string(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "a.txt");
        assert_eq!(json["preview_url"], "");
    }
}
