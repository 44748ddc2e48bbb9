//! UploadService — the upload function itself.
//!
//! One linear path per invocation: parse the event, decode the body, pick
//! the key, write once, answer. Every failure short-circuits into a single
//! failure response; nothing is retried.

use crate::{
    errors::UploadError,
    models::{event::UploadEvent, response::UploadResponse, upload::UploadRequest},
    services::store::{ObjectStore, PutReceipt, ensure_key_safe},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Store handle plus target bucket, built once at startup and cloned into
/// every invocation.
#[derive(Clone)]
pub struct UploadService {
    pub store: Arc<dyn ObjectStore>,
    pub bucket: String,
}

impl UploadService {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Handle an event that has not been checked against [`UploadEvent`] yet.
    pub async fn handle_value(&self, event: Value) -> UploadResponse {
        match serde_json::from_value::<UploadEvent>(event) {
            Ok(event) => self.handle(event).await,
            Err(err) => self.respond(Err(UploadError::MalformedEvent(err))),
        }
    }

    /// Handle an event still in its serialized form.
    pub async fn handle_json(&self, raw: &[u8]) -> UploadResponse {
        match serde_json::from_slice::<UploadEvent>(raw) {
            Ok(event) => self.handle(event).await,
            Err(err) => self.respond(Err(UploadError::MalformedEvent(err))),
        }
    }

    pub async fn handle(&self, event: UploadEvent) -> UploadResponse {
        let result = match UploadRequest::try_from(event) {
            Ok(request) => self.store_upload(request).await,
            Err(err) => Err(err),
        };
        self.respond(result)
    }

    /// Entry for callers that already hold raw bytes and a filename.
    pub async fn handle_request(&self, request: UploadRequest) -> UploadResponse {
        let result = self.store_upload(request).await;
        self.respond(result)
    }

    /// Validate the key and perform the single write.
    pub async fn store_upload(&self, request: UploadRequest) -> Result<PutReceipt, UploadError> {
        let UploadRequest { filename, payload } = request;
        if let Err(reason) = ensure_key_safe(&filename) {
            return Err(UploadError::InvalidFilename { filename, reason });
        }
        let receipt = self
            .store
            .put_object(&self.bucket, &filename, payload)
            .await?;
        Ok(receipt)
    }

    fn respond(&self, result: Result<PutReceipt, UploadError>) -> UploadResponse {
        match result {
            Ok(receipt) => {
                info!(
                    bucket = %receipt.bucket,
                    key = %receipt.key,
                    size_bytes = receipt.size_bytes,
                    etag = receipt.etag.as_deref().unwrap_or(""),
                    backend = self.store.kind(),
                    "upload stored"
                );
                UploadResponse::success(&receipt.key)
            }
            Err(err) => {
                error!(
                    kind = err.kind(),
                    backend = self.store.kind(),
                    "upload failed: {}",
                    err
                );
                UploadResponse::failure(&err)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        models::{
            response::{FAILURE_MESSAGE, ResponseBody, SUCCESS_MESSAGE},
            upload::DEFAULT_FILENAME,
        },
        services::{
            memory_store::MemoryStore,
            store::{StoreError, StoreResult},
        },
    };
    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose writes always fail, counting attempts.
    #[derive(Default)]
    pub(crate) struct FailingStore {
        pub attempts: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for FailingStore {
        fn kind(&self) -> &'static str {
            "failing"
        }

        async fn put_object(&self, _bucket: &str, _key: &str, _body: Bytes) -> StoreResult<PutReceipt> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Backend("AccessDenied: write refused".into()))
        }

        async fn check_ready(&self, _bucket: &str) -> StoreResult<()> {
            Err(StoreError::Backend("AccessDenied: bucket unreachable".into()))
        }
    }

    fn service() -> (UploadService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (UploadService::new(store.clone(), "uploads"), store)
    }

    fn body(resp: &UploadResponse) -> ResponseBody {
        resp.parsed_body().unwrap()
    }

    #[tokio::test]
    async fn plain_body_is_stored_under_header_filename() {
        let (svc, store) = service();
        let resp = svc
            .handle_value(json!({ "body": "hello", "headers": { "X-Filename": "a.txt" } }))
            .await;

        assert_eq!(resp.status_code, 200);
        let body = body(&resp);
        assert_eq!(body.message, SUCCESS_MESSAGE);
        assert_eq!(body.filename.as_deref(), Some("a.txt"));
        assert_eq!(store.get("uploads", "a.txt").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn base64_body_without_header_uses_default_name() {
        let (svc, store) = service();
        let resp = svc
            .handle_value(json!({ "body": "aGVsbG8=", "isBase64Encoded": true, "headers": {} }))
            .await;

        assert_eq!(resp.status_code, 200);
        assert_eq!(body(&resp).filename.as_deref(), Some(DEFAULT_FILENAME));
        assert_eq!(store.get("uploads", DEFAULT_FILENAME).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn invalid_base64_fails_without_writing() {
        let (svc, store) = service();
        let resp = svc
            .handle_value(json!({ "body": "@@not-base64@@", "isBase64Encoded": true, "headers": {} }))
            .await;

        assert_eq!(resp.status_code, 500);
        let body = body(&resp);
        assert_eq!(body.message, FAILURE_MESSAGE);
        assert!(!body.error.unwrap_or_default().is_empty());
        assert!(body.filename.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn missing_body_fails_without_writing() {
        let (svc, store) = service();
        let resp = svc
            .handle_value(json!({ "headers": { "X-Filename": "a.txt" } }))
            .await;

        assert_eq!(resp.status_code, 500);
        assert_eq!(
            body(&resp).error.as_deref(),
            Some(UploadError::MissingBody.to_string().as_str())
        );
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn non_object_event_is_malformed() {
        let (svc, store) = service();
        let resp = svc.handle_value(json!("just a string")).await;

        assert_eq!(resp.status_code, 500);
        assert!(body(&resp).error.unwrap().starts_with("malformed event"));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn unparseable_json_is_malformed() {
        let (svc, store) = service();
        let resp = svc.handle_json(b"{not json").await;

        assert_eq!(resp.status_code, 500);
        assert!(body(&resp).error.unwrap().starts_with("malformed event"));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn storage_failure_surfaces_backend_message() {
        let store = Arc::new(FailingStore::default());
        let svc = UploadService::new(store.clone(), "uploads");
        let resp = svc
            .handle_value(json!({ "body": "aGVsbG8=", "isBase64Encoded": true, "headers": {} }))
            .await;

        assert_eq!(resp.status_code, 500);
        assert_eq!(body(&resp).error.as_deref(), Some("AccessDenied: write refused"));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn identical_invocations_overwrite_one_object() {
        let (svc, store) = service();
        let event = json!({ "body": "hello", "headers": { "X-Filename": "a.txt" } });

        assert_eq!(svc.handle_value(event.clone()).await.status_code, 200);
        assert_eq!(svc.handle_value(event).await.status_code, 200);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("uploads", "a.txt").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn unsafe_filenames_are_refused_before_the_store() {
        let store = Arc::new(FailingStore::default());
        let svc = UploadService::new(store.clone(), "uploads");
        for name in ["../escape.txt", "/etc/passwd", ""] {
            let resp = svc
                .handle_value(json!({ "body": "x", "headers": { "X-Filename": name } }))
                .await;
            assert_eq!(resp.status_code, 500, "{name:?}");
            assert!(body(&resp).error.unwrap().starts_with("invalid filename"));
        }
        assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lowercase_filename_header_falls_back_to_default_name() {
        let (svc, store) = service();
        let resp = svc
            .handle_value(json!({ "body": "hi", "headers": { "x-filename": "lower.txt" } }))
            .await;

        assert_eq!(resp.status_code, 200);
        assert_eq!(body(&resp).filename.as_deref(), Some(DEFAULT_FILENAME));
        assert_eq!(store.get("uploads", DEFAULT_FILENAME).await.unwrap(), "hi");
        assert!(store.get("uploads", "lower.txt").await.is_none());
    }

    #[tokio::test]
    async fn raw_requests_skip_event_decoding() {
        let (svc, store) = service();
        let resp = svc
            .handle_request(UploadRequest::new(Some("bin.dat"), vec![0u8, 159, 146, 150]))
            .await;

        assert_eq!(resp.status_code, 200);
        assert_eq!(
            &store.get("uploads", "bin.dat").await.unwrap()[..],
            &[0u8, 159, 146, 150]
        );
    }
}
