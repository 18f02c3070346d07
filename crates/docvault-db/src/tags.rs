//! PostgreSQL tag repository and document-tag associations.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use docvault_core::{Error, Result, Tag, TagRepository};

#[derive(Clone)]
pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn create(&self, tenant_id: Uuid, name: &str) -> Result<Tag> {
        let row = sqlx::query(
            "INSERT INTO tags (id, tenant_id, name) VALUES ($1, $2, $3) \
             RETURNING id, tenant_id, name, created_at",
        )
        .bind(Uuid::now_v7())
        .bind(tenant_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                Error::Conflict(format!("tag '{}' already exists", name))
            }
            _ => Error::Database(e),
        })?;
        Ok(tag_from_row(&row))
    }

    async fn fetch(&self, id: Uuid) -> Result<Tag> {
        let row = sqlx::query("SELECT id, tenant_id, name, created_at FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("tag {}", id)))?;
        Ok(tag_from_row(&row))
    }

    async fn list_for_document(&self, document_id: Uuid) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.id, t.tenant_id, t.name, t.created_at \
             FROM tags t \
             JOIN document_tags dt ON dt.tag_id = t.id \
             WHERE dt.document_id = $1 \
             ORDER BY t.name",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(tag_from_row).collect())
    }

    async fn attach(&self, document_id: Uuid, tag_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO document_tags (document_id, tag_id) VALUES ($1, $2) \
             ON CONFLICT (document_id, tag_id) DO NOTHING",
        )
        .bind(document_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await?;

        debug!(
            subsystem = "db",
            component = "tags",
            op = "attach",
            document_id = %document_id,
            tag_id = %tag_id,
            created = result.rows_affected() > 0,
            "Attached tag"
        );
        Ok(())
    }

    async fn detach(&self, document_id: Uuid, tag_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM document_tags WHERE document_id = $1 AND tag_id = $2")
            .bind(document_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn tag_from_row(row: &sqlx::postgres::PgRow) -> Tag {
    Tag {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}
