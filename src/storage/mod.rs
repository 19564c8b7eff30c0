//! Object storage for car and customer images.
//!
//! The [`backend::StorageBackend`] trait abstracts over where bytes
//! physically live.  Implementations include local disk, process memory,
//! and a gateway to an AWS S3 bucket.

pub mod aws;
pub mod backend;
pub mod local;
pub mod memory;

use std::time::{SystemTime, UNIX_EPOCH};

/// Default key prefix for uploaded images.
pub const DEFAULT_KEY_PREFIX: &str = "gearshift-images/";

/// Build a fresh object key for an uploaded file:
/// `{prefix}{unix_millis}-{8 hex chars}-{sanitized name}`.
///
/// The random component keeps two uploads of the same file name in the
/// same millisecond apart.
pub fn object_key(prefix: &str, original_name: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}{millis}-{}-{}",
        &nonce[..8],
        sanitize_file_name(original_name)
    )
}

/// Keep the last path component of a client-supplied file name and
/// replace whitespace with `-`.
fn sanitize_file_name(name: &str) -> String {
    let last = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = last
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Guess a MIME type from the key's extension.
pub fn content_type_for(key: &str) -> &'static str {
    let ext = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
