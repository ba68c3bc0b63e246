//! Object store provider trait for reading uploaded documents

use async_trait::async_trait;

use crate::error::Result;

/// Trait for reading source bytes and metadata from the object store
///
/// Implementations:
/// - `LocalObjectStore`: local filesystem
/// - `GcsObjectStore`: Google Cloud Storage (feature `gcp`)
#[async_trait]
pub trait ObjectStoreProvider: Send + Sync {
    /// Object size in bytes, without fetching the body
    async fn head_object(&self, bucket: &str, key: &str) -> Result<u64>;

    /// Fetch the object body
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
