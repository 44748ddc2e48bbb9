//! Process-local object store for development runs and tests.

use crate::services::store::{ObjectStore, PutReceipt, StoreResult, check_key, md5_etag};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<(String, String), Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStore {
    pub async fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> StoreResult<PutReceipt> {
        check_key(key)?;
        let receipt = PutReceipt {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size_bytes: body.len() as u64,
            etag: Some(md5_etag(&body)),
        };
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), body);
        Ok(receipt)
    }

    async fn check_ready(&self, _bucket: &str) -> StoreResult<()> {
        Ok(())
    }
}
