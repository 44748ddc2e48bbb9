//! S3Store — `PutObject` against AWS S3 or an S3-compatible endpoint.

use crate::services::store::{ObjectStore, PutReceipt, StoreError, StoreResult, check_key};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client, error::DisplayErrorContext, primitives::ByteStream};
use bytes::Bytes;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the standard AWS environment (credentials,
    /// region, profile). A custom endpoint switches to path-style
    /// addressing, which most S3-compatible stores expect.
    pub async fn from_env(endpoint: Option<&str>) -> Self {
        let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(url) = endpoint {
            builder = builder.endpoint_url(url).force_path_style(true);
        }
        Self::new(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn kind(&self) -> &'static str {
        "s3"
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> StoreResult<PutReceipt> {
        check_key(key)?;
        let size_bytes = body.len() as u64;

        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| StoreError::Backend(DisplayErrorContext(&err).to_string()))?;
        debug!("PutObject {}/{} returned etag {:?}", bucket, key, output.e_tag());

        Ok(PutReceipt {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size_bytes,
            etag: output.e_tag().map(|tag| tag.trim_matches('"').to_string()),
        })
    }

    async fn check_ready(&self, bucket: &str) -> StoreResult<()> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| StoreError::Backend(DisplayErrorContext(&err).to_string()))?;
        Ok(())
    }
}
