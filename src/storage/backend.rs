//! Abstract object storage trait.
//!
//! Image bytes live behind [`StorageBackend`]; rows only keep the key
//! returned by [`super::object_key`].  Callers never see the medium.

use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;

/// A stored object's data plus its content hash.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Raw bytes of the object.
    pub data: Bytes,
    /// Hex-encoded SHA-256 of `data`.
    pub content_hash: String,
}

/// Async object storage contract.
pub trait StorageBackend: Send + Sync + 'static {
    /// Write `data` to `storage_key`, returning the quoted MD5 ETag.
    fn put(
        &self,
        storage_key: &str,
        data: Bytes,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + '_>>;

    /// Read the full object at `storage_key`; `None` when absent.
    fn get(
        &self,
        storage_key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<StoredObject>>> + Send + '_>>;

    /// Delete the object at `storage_key`.  Deleting a missing key succeeds.
    fn delete(
        &self,
        storage_key: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>>;
}

/// Quoted hex MD5 of `data`, the ETag format every backend returns.
pub fn compute_etag(data: &[u8]) -> String {
    use md5::{Digest, Md5};
    let mut hasher = Md5::new();
    hasher.update(data);
    format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Wrap `data` with its SHA-256 content hash.
pub fn stored_object(data: Bytes) -> StoredObject {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(&data);
    let content_hash = hex::encode(hasher.finalize());
    StoredObject { data, content_hash }
}
