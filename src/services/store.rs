//! The object-store seam.
//!
//! The upload path only needs "put bytes under bucket/key" and a readiness
//! probe; each backend implements [`ObjectStore`] and is shared as
//! `Arc<dyn ObjectStore>`.

use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use thiserror::Error;

const MAX_OBJECT_KEY_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid object key `{key}`: {reason}")]
    InvalidKey { key: String, reason: &'static str },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// What a backend reports after a successful write.
#[derive(Clone, Debug, PartialEq)]
pub struct PutReceipt {
    pub bucket: String,
    pub key: String,
    pub size_bytes: u64,
    /// MD5 hex for local backends, the store's ETag (unquoted) for S3.
    pub etag: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name for logs and readiness output.
    fn kind(&self) -> &'static str;

    /// Write `body` under `bucket/key`, replacing any existing object.
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> StoreResult<PutReceipt>;

    /// Cheap check that writes to `bucket` are expected to succeed.
    async fn check_ready(&self, bucket: &str) -> StoreResult<()>;
}

/// Reject keys that could escape a directory root or confuse a backend.
///
/// Nested keys (`photos/2025/img.jpg`) are fine; `.`/`..` segments,
/// absolute paths, backslashes and control characters are not.
pub fn ensure_key_safe(key: &str) -> Result<(), &'static str> {
    if key.is_empty() {
        return Err("must not be empty");
    }
    if key.len() > MAX_OBJECT_KEY_LEN {
        return Err("must be at most 1024 bytes");
    }
    if key.starts_with('/') {
        return Err("must not start with `/`");
    }
    if key.split('/').any(|segment| segment == "." || segment == "..") {
        return Err("path segments `.` and `..` are not allowed");
    }
    if key.bytes().any(|b| b.is_ascii_control() || b == b'\\') {
        return Err("control characters and backslashes are not allowed");
    }
    Ok(())
}

/// [`ensure_key_safe`] as a [`StoreError`], for use at backend boundaries.
pub fn check_key(key: &str) -> StoreResult<()> {
    ensure_key_safe(key).map_err(|reason| StoreError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}

/// Lowercase hex MD5 of `data`, the conventional single-part ETag.
pub fn md5_etag(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}
