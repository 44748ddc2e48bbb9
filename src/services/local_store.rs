//! LocalStore — objects as files beneath
//! `base_path/{bucket}/{shard}/{shard}/{key}`.
//!
//! Writes land in a temp file next to the target, are fsynced, then renamed
//! over the final path so readers never observe a partial object.

use crate::services::store::{ObjectStore, PutReceipt, StoreError, StoreResult, check_key, md5_etag};
use async_trait::async_trait;
use bytes::Bytes;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct LocalStore {
    /// Base directory on disk where object payloads are stored.
    pub base_path: PathBuf,
}

impl LocalStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn bucket_root(&self, bucket: &str) -> PathBuf {
        self.base_path.join(bucket)
    }

    /// Two-level shard identifiers: the first two bytes of MD5(bucket/key)
    /// as lowercase hex. Keeps per-directory file counts low.
    fn object_shards(bucket: &str, key: &str) -> (String, String) {
        let digest = md5::compute(format!("{}/{}", bucket, key));
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    /// Full payload path for `bucket/key`. Parent directories may not exist yet.
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        let (shard_a, shard_b) = Self::object_shards(bucket, key);
        let mut path = self.bucket_root(bucket);
        path.push(shard_a);
        path.push(shard_b);
        path.push(key);
        path
    }

    async fn write_tmp(tmp_path: &Path, body: &[u8]) -> io::Result<()> {
        let mut file = File::create(tmp_path).await?;
        file.write_all(body).await?;
        file.flush().await?;
        file.sync_all().await
    }

    /// Move `tmp_path` over `file_path`. Platforms whose rename refuses an
    /// existing target get the old object removed first.
    async fn replace_with(tmp_path: &Path, file_path: &Path) -> io::Result<()> {
        match fs::rename(tmp_path, file_path).await {
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                fs::remove_file(file_path).await?;
                fs::rename(tmp_path, file_path).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> StoreResult<PutReceipt> {
        check_key(key)?;

        let file_path = self.object_path(bucket, key);
        let parent = file_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| io_other("object path missing parent directory"))?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        if let Err(err) = Self::write_tmp(&tmp_path, &body).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }

        if let Err(err) = Self::replace_with(&tmp_path, &file_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        debug!("wrote {} bytes to {}", body.len(), file_path.display());

        Ok(PutReceipt {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size_bytes: body.len() as u64,
            etag: Some(md5_etag(&body)),
        })
    }

    /// Write, read back and delete a probe file under the bucket root.
    async fn check_ready(&self, bucket: &str) -> StoreResult<()> {
        let root = self.bucket_root(bucket);
        fs::create_dir_all(&root).await?;

        let probe = root.join(format!(".readyz-{}", Uuid::new_v4()));
        fs::write(&probe, b"readyz").await?;
        let read_back = fs::read(&probe).await;
        // best-effort cleanup before judging the read
        if let Err(err) = fs::remove_file(&probe).await {
            debug!("could not remove probe {}: {}", probe.display(), err);
        }
        if read_back? != b"readyz" {
            return Err(io_other("probe file content mismatch"));
        }
        Ok(())
    }
}

fn io_other(msg: &'static str) -> StoreError {
    StoreError::Io(io::Error::new(ErrorKind::Other, msg))
}
