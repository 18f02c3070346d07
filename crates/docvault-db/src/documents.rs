//! PostgreSQL document repository.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use docvault_core::{
    defaults::DUPLICATE_CHECKSUM_MSG, Document, DocumentPatch, DocumentRepository, Error,
    NewDocument, Result,
};

const DOCUMENT_COLUMNS: &str = "id, tenant_id, folder_id, name, object_key, preview_key, \
    file_size, mime_type, checksum, sender_id, created_by, updated_by, created_at, updated_at";

/// PostgreSQL implementation of [`DocumentRepository`].
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations into the core taxonomy.
///
/// The checksum unique constraint becomes `Conflict`; a dangling folder
/// reference becomes `Validation`. Everything else stays a database error.
pub(crate) fn map_write_error(err: sqlx::Error) -> Error {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("documents_checksum_key") {
            return Error::Conflict(DUPLICATE_CHECKSUM_MSG.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return Error::Validation(db_err.message().to_string());
        }
    }
    Error::Database(err)
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn insert(&self, doc: NewDocument) -> Result<Document> {
        let sql = format!(
            "INSERT INTO documents (id, tenant_id, folder_id, name, object_key, file_size, \
             mime_type, checksum, sender_id, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10) \
             RETURNING {DOCUMENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(doc.id)
            .bind(doc.tenant_id)
            .bind(doc.folder_id)
            .bind(&doc.name)
            .bind(&doc.object_key)
            .bind(doc.file_size)
            .bind(&doc.mime_type)
            .bind(&doc.checksum)
            .bind(doc.sender_id)
            .bind(doc.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        debug!(
            subsystem = "db",
            component = "documents",
            op = "insert",
            document_id = %doc.id,
            "Inserted document row"
        );
        Ok(document_from_row(&row))
    }

    async fn fetch(&self, id: Uuid) -> Result<Document> {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("document {}", id)))?;
        Ok(document_from_row(&row))
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Document>> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE tenant_id = $1 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(document_from_row).collect())
    }

    async fn list_by_folder(&self, folder_id: Uuid) -> Result<Vec<Document>> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE folder_id = $1 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(folder_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(document_from_row).collect())
    }

    async fn update(&self, id: Uuid, patch: DocumentPatch) -> Result<Document> {
        let sql = format!(
            "UPDATE documents SET \
                 name = COALESCE($2, name), \
                 folder_id = COALESCE($3, folder_id), \
                 sender_id = COALESCE($4, sender_id), \
                 updated_by = $5, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {DOCUMENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(patch.folder_id)
            .bind(patch.sender_id)
            .bind(patch.updated_by)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| Error::NotFound(format!("document {}", id)))?;
        Ok(document_from_row(&row))
    }

    async fn set_preview_key(&self, id: Uuid, key: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE documents SET preview_key = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(key)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("document {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("document {}", id)));
        }
        Ok(())
    }
}

fn document_from_row(row: &sqlx::postgres::PgRow) -> Document {
    Document {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        folder_id: row.get("folder_id"),
        name: row.get("name"),
        object_key: row.get("object_key"),
        preview_key: row.get("preview_key"),
        file_size: row.get("file_size"),
        mime_type: row.get("mime_type"),
        checksum: row.get("checksum"),
        sender_id: row.get("sender_id"),
        created_by: row.get("created_by"),
        updated_by: row.get("updated_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
