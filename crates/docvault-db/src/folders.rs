//! PostgreSQL folder repository.
//!
//! Folder management lives outside the ingestion core; this repository only
//! covers what the core needs for tenant-ownership checks, plus creation
//! for fixtures and the CLI.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use docvault_core::{Error, Folder, FolderRepository, Result};

#[derive(Clone)]
pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn create(
        &self,
        tenant_id: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Folder> {
        let row = sqlx::query(
            "INSERT INTO folders (id, tenant_id, parent_id, name) VALUES ($1, $2, $3, $4) \
             RETURNING id, tenant_id, parent_id, name, created_at",
        )
        .bind(Uuid::now_v7())
        .bind(tenant_id)
        .bind(parent_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(folder_from_row(&row))
    }

    async fn fetch(&self, id: Uuid) -> Result<Folder> {
        let row = sqlx::query(
            "SELECT id, tenant_id, parent_id, name, created_at FROM folders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("folder {}", id)))?;
        Ok(folder_from_row(&row))
    }
}

fn folder_from_row(row: &sqlx::postgres::PgRow) -> Folder {
    Folder {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        parent_id: row.get("parent_id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}
