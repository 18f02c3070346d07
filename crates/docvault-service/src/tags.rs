//! Document-tag associations.

use tracing::debug;
use uuid::Uuid;

use docvault_core::{Error, Result, Tag};

use crate::service::DocumentService;

impl DocumentService {
    /// Attach a tag. Attaching twice is a no-op.
    pub async fn add_tag(&self, tenant_id: Uuid, document_id: Uuid, tag_id: Uuid) -> Result<()> {
        self.check_tag(tenant_id, document_id, tag_id).await?;
        self.tags.attach(document_id, tag_id).await?;
        debug!(
            subsystem = "service",
            component = "tags",
            op = "add",
            document_id = %document_id,
            tag_id = %tag_id,
            "Tag attached"
        );
        Ok(())
    }

    pub async fn remove_tag(&self, tenant_id: Uuid, document_id: Uuid, tag_id: Uuid) -> Result<()> {
        self.check_tag(tenant_id, document_id, tag_id).await?;
        self.tags.detach(document_id, tag_id).await?;
        debug!(
            subsystem = "service",
            component = "tags",
            op = "remove",
            document_id = %document_id,
            tag_id = %tag_id,
            "Tag detached"
        );
        Ok(())
    }

    pub async fn list_tags(&self, tenant_id: Uuid, document_id: Uuid) -> Result<Vec<Tag>> {
        let doc = self.fetch_owned(tenant_id, document_id).await?;
        self.tags.list_for_document(doc.id).await
    }

    async fn check_tag(&self, tenant_id: Uuid, document_id: Uuid, tag_id: Uuid) -> Result<()> {
        let doc = self.fetch_owned(tenant_id, document_id).await?;
        let tag = self.tags.fetch(tag_id).await?;
        if tag.tenant_id != doc.tenant_id {
            return Err(Error::Validation(format!(
                "tag {} belongs to another tenant",
                tag_id
            )));
        }
        Ok(())
    }
}
