//! S3-compatible object storage (Cloudflare R2, MinIO, AWS)
//!
//! Handles upload, delete, and URL generation for uploaded materials.
//! Files are served via a custom domain (CDN) rather than presigned URLs.

use aws_sdk_s3::Client as S3Client;

use super::ObjectStore;
use crate::config::StorageConfig;
use crate::error::AppError;

/// Material file storage backed by an S3-compatible bucket
pub struct S3ObjectStore {
    client: S3Client,
    /// Bucket name
    bucket: String,
    /// Public URL base (custom domain)
    /// e.g., "https://files.example.com"
    public_url: String,
}

impl S3ObjectStore {
    /// Create a new storage client
    ///
    /// # Errors
    /// Returns error if required credentials are missing
    pub async fn new(config: &StorageConfig) -> Result<Self, AppError> {
        use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

        let access_key_id = config.s3.access_key_id.clone().ok_or_else(|| {
            AppError::Config("storage.s3.access_key_id is required".to_string())
        })?;
        let secret_access_key = config.s3.secret_access_key.clone().ok_or_else(|| {
            AppError::Config("storage.s3.secret_access_key is required".to_string())
        })?;

        let credentials = Credentials::new(
            &access_key_id,
            &secret_access_key,
            None,
            None,
            "openshelf-s3",
        );

        let region = config.s3.region.clone().unwrap_or_else(|| "auto".to_string());

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region))
            .http_client(super::build_s3_http_client())
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.s3.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = S3Client::from_conf(builder.build());

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            public_url: config.public_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        use aws_sdk_s3::primitives::ByteStream;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .cache_control("public, max-age=31536000") // 1 year
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("object upload failed: {}", e)))?;

        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        // S3 DeleteObject succeeds for missing keys, which matches the
        // delete(path) -> success|NotFound contract callers rely on.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("object delete failed: {}", e)))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}
