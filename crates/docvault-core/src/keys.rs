//! Object key layout.
//!
//! Originals live at `{tenant}/{random}{ext}` and previews at
//! `{tenant}/previews/{random}.pdf`. Keys never contain the user-supplied
//! name, so traversal sequences and collisions in names are irrelevant.

use uuid::Uuid;

use crate::defaults::PREVIEW_PREFIX;

/// Key for an original upload. `ext` includes the leading dot or is empty.
pub fn object_key(tenant_id: Uuid, ext: &str) -> String {
    format!("{}/{}{}", tenant_id, Uuid::new_v4(), ext)
}

/// Key for a generated PDF preview.
pub fn preview_key(tenant_id: Uuid) -> String {
    format!("{}/{}/{}.pdf", tenant_id, PREVIEW_PREFIX, Uuid::new_v4())
}

/// Final path segment of a key, used as the file name sent to converters.
pub fn base_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
