//! HTTP vector search index
//!
//! Speaks an Elasticsearch-compatible REST API: index existence and schema
//! bootstrap, then per-chunk writes where the cluster assigns the document
//! identifier that becomes the correlation key.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::types::ChunkRecord;

use super::vector_index::VectorIndexProvider;

/// Elasticsearch-compatible vector index client
pub struct HttpSearchIndex {
    client: Client,
    base_url: String,
    index_name: String,
}

#[derive(Deserialize)]
struct IndexDocResponse {
    #[serde(rename = "_id", default)]
    id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}

impl HttpSearchIndex {
    /// Create a client for the configured cluster and index name
    pub fn new(config: &IndexConfig, index_name: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            index_name,
        }
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url, self.index_name)
    }

    /// Mapping for the chunk index: keyword identity fields, a full-text
    /// field for the chunk body, a cosine dense-vector field, and a date
    /// field for retention
    fn index_schema(dimensions: usize) -> serde_json::Value {
        json!({
            "mappings": {
                "properties": {
                    "document_id": { "type": "keyword" },
                    "tenant_id": { "type": "keyword" },
                    "source_key": { "type": "keyword" },
                    "chunk_index": { "type": "integer" },
                    "text": { "type": "text" },
                    "embedding": {
                        "type": "dense_vector",
                        "dims": dimensions,
                        "index": true,
                        "similarity": "cosine"
                    },
                    "expires_at": { "type": "date" }
                }
            }
        })
    }

    async fn index_exists(&self) -> Result<bool> {
        let response = self
            .client
            .head(self.index_url())
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("Index existence check failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::VectorDb(format!(
                "Unexpected status {} checking index {}",
                status, self.index_name
            ))),
        }
    }

    async fn create_index(&self, dimensions: usize) -> Result<()> {
        let response = self
            .client
            .put(self.index_url())
            .json(&Self::index_schema(dimensions))
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("Index creation failed: {}", e)))?;

        if response.status().is_success() {
            tracing::info!("Created vector index {}", self.index_name);
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        // Lost the creation race; the index being there is all we need.
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
            if parsed
                .error
                .and_then(|e| e.error_type)
                .is_some_and(|t| t == "resource_already_exists_exception")
            {
                return Ok(());
            }
        }

        Err(Error::VectorDb(format!(
            "Index creation failed ({}): {}",
            status, body
        )))
    }
}

#[async_trait]
impl VectorIndexProvider for HttpSearchIndex {
    async fn ensure_index(&self, dimensions: usize) -> Result<()> {
        if self.index_exists().await? {
            return Ok(());
        }
        self.create_index(dimensions).await
    }

    async fn index_chunk(&self, chunk: &ChunkRecord, embedding: &[f32]) -> Result<String> {
        let body = json!({
            "document_id": chunk.document_id,
            "tenant_id": chunk.tenant_id,
            "source_key": chunk.source_key,
            "chunk_index": chunk.chunk_index,
            "text": chunk.text,
            "embedding": embedding,
            "expires_at": chunk.expires_at,
        });

        // No client-supplied id: the cluster assigns one and we read it back.
        let response = self
            .client
            .post(format!("{}/_doc", self.index_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("Vector write failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::VectorDb(format!(
                "Vector write failed ({}): {}",
                status, body
            )));
        }

        let doc_response: IndexDocResponse = response
            .json()
            .await
            .map_err(|e| Error::VectorDb(format!("Failed to parse index response: {}", e)))?;

        match doc_response.id {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(Error::IndexCorrelation {
                document_id: chunk.document_id.clone(),
                chunk_index: chunk.chunk_index,
                vector_id: None,
                message: "index accepted the write but returned no identifier".to_string(),
            }),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/_cluster/health", self.base_url))
            .send()
            .await
            .map_err(|e| Error::VectorDb(format!("Cluster health check failed: {}", e)))?;
        Ok(response.status().is_success())
    }

    fn name(&self) -> &str {
        "http-search-index"
    }
}
