//! Google Cloud Storage object store
//!
//! Reads uploaded documents from GCS when the pipeline runs with the cloud
//! backend.

use async_trait::async_trait;

use google_cloud_storage::client::Client as GcsClient;
use google_cloud_storage::http::objects::download::Range;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::list::ListObjectsRequest;

use crate::error::{Error, Result};

use super::object_store::ObjectStoreProvider;

/// Google Cloud Storage object store
pub struct GcsObjectStore {
    client: GcsClient,
    /// Bucket used for health probes; reads name their own bucket
    bucket: String,
}

impl GcsObjectStore {
    /// Create a new GCS object store using application-default credentials
    pub async fn new(bucket: String) -> Result<Self> {
        let config = google_cloud_storage::client::ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| Error::Config(format!("Failed to create GCS client: {}", e)))?;

        Ok(Self {
            client: GcsClient::new(config),
            bucket,
        })
    }
}

#[async_trait]
impl ObjectStoreProvider for GcsObjectStore {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<u64> {
        let object = self
            .client
            .get_object(&GetObjectRequest {
                bucket: bucket.to_string(),
                object: key.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|e| Error::ObjectStore(format!("Failed to stat gs://{}/{}: {}", bucket, key, e)))?;

        Ok(object.size as u64)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.client
            .download_object(
                &GetObjectRequest {
                    bucket: bucket.to_string(),
                    object: key.to_string(),
                    ..Default::default()
                },
                &Range::default(),
            )
            .await
            .map_err(|e| Error::ObjectStore(format!("Failed to read gs://{}/{}: {}", bucket, key, e)))
    }

    async fn health_check(&self) -> Result<bool> {
        // Listing with a limit of one is enough to prove credentials work.
        let list_request = ListObjectsRequest {
            bucket: self.bucket.clone(),
            max_results: Some(1),
            ..Default::default()
        };

        match self.client.list_objects(&list_request).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "gcs"
    }
}
