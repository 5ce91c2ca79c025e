//! AWS S3 snapshot storage.
//!
//! Each key is one object, `s3://{bucket}/{prefix}/{key}.json`. A single
//! `PutObject` replaces the previous snapshot, so readers never see a
//! partial value.

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::StorageConfig;
use crate::storage::SnapshotStore;

/// S3-based snapshot storage.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Create S3 storage from the ambient AWS environment and the storage config.
    ///
    /// `S3_BUCKET` and `S3_PREFIX` override the configured values.
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&aws);

        let bucket = std::env::var("S3_BUCKET").unwrap_or_else(|_| config.bucket.clone());
        let prefix = std::env::var("S3_PREFIX").unwrap_or_else(|_| config.prefix.clone());

        log::info!("Using S3 snapshot storage at s3://{}/{}", bucket, prefix);
        Ok(Self::new(client, bucket, prefix))
    }

    fn object_key(&self, key: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}.json", key)
        } else {
            format!("{}/{}.json", prefix, key)
        }
    }
}

#[async_trait]
impl SnapshotStore for S3Storage {
    async fn get(&self, key: &str) -> Result<String> {
        let object_key = self.object_key(key);
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::S3(e.to_string()))?;
                String::from_utf8(bytes.into_bytes().to_vec()).map_err(|e| {
                    AppError::S3(format!(
                        "s3://{}/{} is not valid UTF-8: {}",
                        self.bucket, object_key, e
                    ))
                })
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    log::debug!("No snapshot at s3://{}/{}", self.bucket, object_key);
                    Err(AppError::not_found(key))
                } else {
                    Err(AppError::S3(service_err.to_string()))
                }
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let object_key = self.object_key(key);
        let bytes = ByteStream::from(value.as_bytes().to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(bytes)
            .content_type("application/json; charset=utf-8")
            .send()
            .await
            .map_err(|e| AppError::S3(e.to_string()))?;

        log::debug!("Wrote s3://{}/{}", self.bucket, object_key);
        Ok(())
    }
}
