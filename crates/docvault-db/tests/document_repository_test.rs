//! PostgreSQL repository tests.
//!
//! These need a running database (see `test_fixtures::DEFAULT_TEST_DATABASE_URL`)
//! and are ignored by default. Run with `cargo test -p docvault-db -- --ignored`.

use docvault_core::{DocumentPatch, DocumentRepository, Error, FolderRepository, TagRepository};
use docvault_db::test_fixtures::{new_document, TestDatabase};
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_insert_and_fetch_document() {
    let test_db = TestDatabase::new().await;
    let new = new_document(test_db.tenant_id);
    let created = test_db.db.documents.insert(new.clone()).await.unwrap();

    assert_eq!(created.id, new.id);
    assert_eq!(created.checksum, new.checksum);
    assert!(created.preview_key.is_none());

    let fetched = test_db.db.documents.fetch(new.id).await.unwrap();
    assert_eq!(fetched.object_key, new.object_key);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_duplicate_checksum_is_conflict() {
    let test_db = TestDatabase::new().await;
    let first = new_document(test_db.tenant_id);
    let mut second = new_document(test_db.tenant_id);
    second.checksum = first.checksum.clone();

    test_db.db.documents.insert(first).await.unwrap();
    let err = test_db.db.documents.insert(second).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)), "got {err:?}");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_fetch_missing_is_not_found() {
    let test_db = TestDatabase::new().await;
    let err = test_db.db.documents.fetch(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_update_and_preview_key() {
    let test_db = TestDatabase::new().await;
    let folder = test_db
        .db
        .folders
        .create(test_db.tenant_id, "contracts", None)
        .await
        .unwrap();
    let doc = test_db
        .db
        .documents
        .insert(new_document(test_db.tenant_id))
        .await
        .unwrap();

    let updated = test_db
        .db
        .documents
        .update(
            doc.id,
            DocumentPatch {
                name: Some("moved.txt".to_string()),
                folder_id: Some(folder.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "moved.txt");
    assert_eq!(updated.folder_id, Some(folder.id));

    test_db
        .db
        .documents
        .set_preview_key(doc.id, "t/previews/p.pdf")
        .await
        .unwrap();
    let listed = test_db.db.documents.list_by_folder(folder.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].preview_key.as_deref(), Some("t/previews/p.pdf"));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_cascades_associations() {
    let test_db = TestDatabase::new().await;
    let doc = test_db
        .db
        .documents
        .insert(new_document(test_db.tenant_id))
        .await
        .unwrap();
    let tag = test_db
        .db
        .tags
        .create(test_db.tenant_id, &format!("tag-{}", Uuid::new_v4()))
        .await
        .unwrap();

    test_db.db.tags.attach(doc.id, tag.id).await.unwrap();
    test_db.db.tags.attach(doc.id, tag.id).await.unwrap();
    assert_eq!(test_db.db.tags.list_for_document(doc.id).await.unwrap().len(), 1);

    test_db.db.documents.delete(doc.id).await.unwrap();
    assert!(test_db.db.tags.list_for_document(doc.id).await.unwrap().is_empty());

    test_db.cleanup().await;
}
