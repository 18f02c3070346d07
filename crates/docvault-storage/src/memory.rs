//! In-memory object store for tests.
//!
//! Presigned URLs use a `memory://` scheme carrying the key and expiry so
//! tests can assert on them. Put, remove and presign failures can be
//! injected to exercise compensation and degraded paths.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::RwLock;

use docvault_core::{defaults, Error, ObjectStore, Result};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    fail_puts: Arc<AtomicBool>,
    fail_removes: Arc<AtomicBool>,
    fail_presigns: Arc<AtomicBool>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Make subsequent `put` calls fail after consuming the stream.
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `remove` calls fail.
    pub fn set_fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `presign_get` calls fail.
    pub fn set_fail_presigns(&self, fail: bool) {
        self.fail_presigns.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        _size: u64,
        content_type: &str,
    ) -> Result<u64> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Error::Storage(format!("injected put failure for {}", key)));
        }
        let written = data.len() as u64;
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(written)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| Error::Storage(format!("no such key: {}", key)))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(Error::Storage(format!("injected remove failure for {}", key)));
        }
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String> {
        if self.fail_presigns.load(Ordering::SeqCst) {
            return Err(Error::Storage(format!("injected presign failure for {}", key)));
        }
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(format!(
            "memory://{}/{}?expires={}",
            defaults::BUCKET,
            key,
            (now + ttl).as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = MemoryObjectStore::new();
        let mut reader: &[u8] = b"hello world";
        let written = store
            .put("t/a.txt", &mut reader, 11, "text/plain")
            .await
            .unwrap();
        assert_eq!(written, 11);
        assert_eq!(store.get("t/a.txt").await.unwrap(), b"hello world");
        assert_eq!(store.object("t/a.txt").await.unwrap().content_type, "text/plain");

        store.remove("t/a.txt").await.unwrap();
        assert_eq!(store.object_count().await, 0);
        // Removing a missing key is fine.
        store.remove("t/a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryObjectStore::new();
        store.set_fail_puts(true);
        let mut reader: &[u8] = b"x";
        assert!(store.put("k", &mut reader, 1, "text/plain").await.is_err());
        assert_eq!(store.object_count().await, 0);

        store.set_fail_removes(true);
        assert!(matches!(store.remove("k").await, Err(Error::Storage(_))));

        store.set_fail_presigns(true);
        let signed = store.presign_get("k", Duration::from_secs(60)).await;
        assert!(matches!(signed, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_presign_embeds_key() {
        let store = MemoryObjectStore::new();
        let url = store
            .presign_get("t/a.txt", Duration::from_secs(3600))
            .await
            .unwrap();
        assert!(url.starts_with("memory://documents/t/a.txt?expires="));
    }
}
