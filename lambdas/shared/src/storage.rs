//! Object storage for original images and thumbnails

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::errors::{Error, Result};

/// Object storage operations used by the upload and resize paths
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read a whole object into memory
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Write a whole object
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;

    /// Pre-signed PUT URL for `key`, valid for `expires_in`. Pure credential
    /// computation; nothing is written.
    async fn presign_put(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String>;
}

/// S3-backed [`ObjectStore`]
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        Ok(body.into_bytes().to_vec())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        Ok(())
    }

    async fn presign_put(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| Error::Config(format!("Failed to create presigning config: {}", e)))?;

        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| Error::Storage(format!("Failed to generate presigned URL: {}", e)))?;

        debug!(bucket = %bucket, key = %key, expires_in = expires_in.as_secs(), "Generated upload URL");

        Ok(request.uri().to_string())
    }
}
