//! In-memory storage backend.
//!
//! Objects are held in a `tokio::sync::RwLock<HashMap<...>>`.  Nothing is
//! persisted; a configurable limit (`max_size_bytes`) caps total stored bytes.

use bytes::Bytes;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use super::backend::{compute_etag, stored_object, StorageBackend, StoredObject};

#[derive(Debug, Default)]
struct Objects {
    /// storage_key -> data
    data: HashMap<String, Bytes>,
    /// Current total bytes stored.
    total_bytes: u64,
}

/// In-memory storage backend.
pub struct MemoryBackend {
    objects: tokio::sync::RwLock<Objects>,
    /// Maximum bytes allowed.  0 means unlimited.
    max_size_bytes: u64,
}

impl MemoryBackend {
    /// Create a new `MemoryBackend` holding at most `max_size_bytes`
    /// (0 for no limit).
    pub fn new(max_size_bytes: u64) -> Self {
        Self {
            objects: tokio::sync::RwLock::new(Objects::default()),
            max_size_bytes,
        }
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.data.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(0)
    }
}

impl StorageBackend for MemoryBackend {
    fn put(
        &self,
        storage_key: &str,
        data: Bytes,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>> {
        let storage_key = storage_key.to_string();
        Box::pin(async move {
            let etag = compute_etag(&data);
            let mut objects = self.objects.write().await;

            let replaced = objects
                .data
                .get(&storage_key)
                .map_or(0, |old| old.len() as u64);
            let new_total = objects.total_bytes - replaced + data.len() as u64;
            if self.max_size_bytes > 0 && new_total > self.max_size_bytes {
                anyhow::bail!(
                    "Memory limit exceeded: current={}, additional={}, max={}",
                    objects.total_bytes,
                    data.len(),
                    self.max_size_bytes
                );
            }

            objects.total_bytes = new_total;
            objects.data.insert(storage_key, data);
            Ok(etag)
        })
    }

    fn get(
        &self,
        storage_key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<StoredObject>>> + Send + '_>> {
        let storage_key = storage_key.to_string();
        Box::pin(async move {
            let objects = self.objects.read().await;
            Ok(objects.data.get(&storage_key).cloned().map(stored_object))
        })
    }

    fn delete(
        &self,
        storage_key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        let storage_key = storage_key.to_string();
        Box::pin(async move {
            let mut objects = self.objects.write().await;
            if let Some(old) = objects.data.remove(&storage_key) {
                objects.total_bytes = objects.total_bytes.saturating_sub(old.len() as u64);
            }
            Ok(())
        })
    }
}
