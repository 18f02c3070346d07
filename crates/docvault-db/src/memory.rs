//! In-memory metadata store.
//!
//! Implements the document, folder, and tag repositories over a single
//! lock-protected map set, enforcing the same constraints as the SQL schema:
//! unique checksum, folder references must exist, and deleting a document
//! cascades its tag associations. Used by tests and local experiments.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use docvault_core::{
    defaults::DUPLICATE_CHECKSUM_MSG, Document, DocumentPatch, DocumentRepository, Error, Folder,
    FolderRepository, NewDocument, Result, Tag, TagRepository,
};

#[derive(Default)]
struct Inner {
    documents: HashMap<Uuid, Document>,
    folders: HashMap<Uuid, Folder>,
    tags: HashMap<Uuid, Tag>,
    document_tags: BTreeSet<(Uuid, Uuid)>,
}

#[derive(Clone, Default)]
pub struct MemoryMetadataStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn document_count(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    /// Number of (document, tag) associations.
    pub async fn association_count(&self) -> usize {
        self.inner.read().await.document_tags.len()
    }
}

fn sorted_newest_first(mut docs: Vec<Document>) -> Vec<Document> {
    docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    docs
}

#[async_trait]
impl DocumentRepository for MemoryMetadataStore {
    async fn insert(&self, doc: NewDocument) -> Result<Document> {
        let mut inner = self.inner.write().await;

        if inner.documents.values().any(|d| d.checksum == doc.checksum) {
            return Err(Error::Conflict(DUPLICATE_CHECKSUM_MSG.to_string()));
        }
        if inner.documents.contains_key(&doc.id) {
            return Err(Error::Internal(format!("duplicate document id {}", doc.id)));
        }
        if let Some(folder_id) = doc.folder_id {
            if !inner.folders.contains_key(&folder_id) {
                return Err(Error::Validation(format!("folder {} does not exist", folder_id)));
            }
        }

        let now = Utc::now();
        let document = Document {
            id: doc.id,
            tenant_id: doc.tenant_id,
            folder_id: doc.folder_id,
            name: doc.name,
            object_key: doc.object_key,
            preview_key: None,
            file_size: doc.file_size,
            mime_type: doc.mime_type,
            checksum: doc.checksum,
            sender_id: doc.sender_id,
            created_by: doc.created_by,
            updated_by: doc.created_by,
            created_at: now,
            updated_at: now,
        };
        inner.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn fetch(&self, id: Uuid) -> Result<Document> {
        self.inner
            .read()
            .await
            .documents
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("document {}", id)))
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Document>> {
        let inner = self.inner.read().await;
        Ok(sorted_newest_first(
            inner
                .documents
                .values()
                .filter(|d| d.tenant_id == tenant_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_by_folder(&self, folder_id: Uuid) -> Result<Vec<Document>> {
        let inner = self.inner.read().await;
        Ok(sorted_newest_first(
            inner
                .documents
                .values()
                .filter(|d| d.folder_id == Some(folder_id))
                .cloned()
                .collect(),
        ))
    }

    async fn update(&self, id: Uuid, patch: DocumentPatch) -> Result<Document> {
        let mut inner = self.inner.write().await;
        if let Some(folder_id) = patch.folder_id {
            if !inner.folders.contains_key(&folder_id) {
                return Err(Error::Validation(format!("folder {} does not exist", folder_id)));
            }
        }
        let doc = inner
            .documents
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("document {}", id)))?;

        if let Some(name) = patch.name {
            doc.name = name;
        }
        if patch.folder_id.is_some() {
            doc.folder_id = patch.folder_id;
        }
        if patch.sender_id.is_some() {
            doc.sender_id = patch.sender_id;
        }
        doc.updated_by = patch.updated_by;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn set_preview_key(&self, id: Uuid, key: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .documents
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("document {}", id)))?;
        doc.preview_key = Some(key.to_string());
        doc.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.documents.remove(&id).is_none() {
            return Err(Error::NotFound(format!("document {}", id)));
        }
        inner.document_tags.retain(|(doc_id, _)| *doc_id != id);
        Ok(())
    }
}

#[async_trait]
impl FolderRepository for MemoryMetadataStore {
    async fn create(
        &self,
        tenant_id: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Folder> {
        let folder = Folder {
            id: Uuid::now_v7(),
            tenant_id,
            parent_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .folders
            .insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn fetch(&self, id: Uuid) -> Result<Folder> {
        self.inner
            .read()
            .await
            .folders
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("folder {}", id)))
    }
}

#[async_trait]
impl TagRepository for MemoryMetadataStore {
    async fn create(&self, tenant_id: Uuid, name: &str) -> Result<Tag> {
        let mut inner = self.inner.write().await;
        if inner
            .tags
            .values()
            .any(|t| t.tenant_id == tenant_id && t.name == name)
        {
            return Err(Error::Conflict(format!("tag '{}' already exists", name)));
        }
        let tag = Tag {
            id: Uuid::now_v7(),
            tenant_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        inner.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn fetch(&self, id: Uuid) -> Result<Tag> {
        self.inner
            .read()
            .await
            .tags
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("tag {}", id)))
    }

    async fn list_for_document(&self, document_id: Uuid) -> Result<Vec<Tag>> {
        let inner = self.inner.read().await;
        let mut tags: Vec<Tag> = inner
            .document_tags
            .iter()
            .filter(|(doc_id, _)| *doc_id == document_id)
            .filter_map(|(_, tag_id)| inner.tags.get(tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn attach(&self, document_id: Uuid, tag_id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.documents.contains_key(&document_id) {
            return Err(Error::Validation(format!(
                "document {} does not exist",
                document_id
            )));
        }
        if !inner.tags.contains_key(&tag_id) {
            return Err(Error::Validation(format!("tag {} does not exist", tag_id)));
        }
        inner.document_tags.insert((document_id, tag_id));
        Ok(())
    }

    async fn detach(&self, document_id: Uuid, tag_id: Uuid) -> Result<()> {
        self.inner
            .write()
            .await
            .document_tags
            .remove(&(document_id, tag_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_doc(tenant_id: Uuid, checksum: &str) -> NewDocument {
        NewDocument {
            id: Uuid::new_v4(),
            tenant_id,
            folder_id: None,
            name: "a.txt".to_string(),
            object_key: format!("{}/{}.txt", tenant_id, Uuid::new_v4()),
            file_size: 10,
            mime_type: "text/plain".to_string(),
            checksum: checksum.to_string(),
            sender_id: None,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_checksum_conflicts() {
        let store = MemoryMetadataStore::new();
        let tenant = Uuid::new_v4();
        store.insert(new_doc(tenant, "abc")).await.unwrap();
        let err = store.insert(new_doc(tenant, "abc")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.document_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_cascades_tags() {
        let store = MemoryMetadataStore::new();
        let tenant = Uuid::new_v4();
        let doc = store.insert(new_doc(tenant, "abc")).await.unwrap();
        let tag = TagRepository::create(&store, tenant, "urgent").await.unwrap();
        store.attach(doc.id, tag.id).await.unwrap();
        assert_eq!(store.association_count().await, 1);

        DocumentRepository::delete(&store, doc.id).await.unwrap();
        assert_eq!(store.association_count().await, 0);
        assert!(matches!(
            DocumentRepository::fetch(&store, doc.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_attach_is_idempotent() {
        let store = MemoryMetadataStore::new();
        let tenant = Uuid::new_v4();
        let doc = store.insert(new_doc(tenant, "abc")).await.unwrap();
        let tag = TagRepository::create(&store, tenant, "urgent").await.unwrap();
        store.attach(doc.id, tag.id).await.unwrap();
        store.attach(doc.id, tag.id).await.unwrap();
        assert_eq!(store.list_for_document(doc.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_unset_fields() {
        let store = MemoryMetadataStore::new();
        let tenant = Uuid::new_v4();
        let folder = FolderRepository::create(&store, tenant, "inbox", None)
            .await
            .unwrap();
        let mut new = new_doc(tenant, "abc");
        new.folder_id = Some(folder.id);
        let doc = store.insert(new).await.unwrap();

        let editor = Uuid::new_v4();
        let updated = store
            .update(
                doc.id,
                DocumentPatch {
                    name: Some("renamed.txt".to_string()),
                    updated_by: Some(editor),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "renamed.txt");
        assert_eq!(updated.folder_id, Some(folder.id));
        assert_eq!(updated.updated_by, Some(editor));
        assert_eq!(updated.object_key, doc.object_key);
    }

    #[tokio::test]
    async fn test_insert_with_missing_folder_rejected() {
        let store = MemoryMetadataStore::new();
        let mut new = new_doc(Uuid::new_v4(), "abc");
        new.folder_id = Some(Uuid::new_v4());
        assert!(matches!(
            store.insert(new).await,
            Err(Error::Validation(_))
        ));
    }
}
