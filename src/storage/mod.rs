//! Object storage for uploaded materials
//!
//! Files are addressed by key and served via a public URL (custom
//! domain / CDN). The `ObjectStore` trait is the seam between the
//! lifecycle engine and the concrete backend: S3-compatible stores
//! (R2, MinIO, AWS) in production, an in-memory store for local
//! development and tests.

mod memory;
mod s3;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::AppError;

/// Durable storage for uploaded binary files
///
/// `upload` must complete before any metadata referencing the key is
/// written, so a failed upload never leaves a dangling record.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a file and return its public retrieval URL
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError>;

    /// Delete a file; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Public URL for a key
    fn public_url(&self, key: &str) -> String;
}

/// Construct the configured backend
pub async fn build_object_store(
    config: &StorageConfig,
) -> Result<Arc<dyn ObjectStore>, AppError> {
    match config.backend {
        StorageBackend::S3 => Ok(Arc::new(S3ObjectStore::new(config).await?)),
        StorageBackend::Memory => Ok(Arc::new(MemoryObjectStore::new(&config.public_url))),
    }
}

/// Key for a material's backing file, under the materials/ prefix.
pub fn material_object_key(id: &str) -> String {
    format!("materials/{}.pdf", id)
}

pub(crate) fn build_s3_http_client() -> aws_sdk_s3::config::SharedHttpClient {
    use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;

    let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_only()
        .enable_http1()
        .enable_http2()
        .build();

    HyperClientBuilder::new().build(https_connector)
}
