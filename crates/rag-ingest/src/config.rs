//! Configuration for the ingestion pipeline
//!
//! The pipeline is a function of (event, config, provider clients); nothing
//! reads the process environment from leaf code. The `environment` tag only
//! selects name suffixes and the notification base URL.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Backend provider for the object store (local or gcp)
    #[serde(default)]
    pub backend: BackendProvider,
    /// Environment tag ("dev", "prod"); suffixes index and table names
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// OCR / text extraction configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Embedding endpoint configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Vector search index configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// Metadata / lookup store configuration
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Status notification configuration
    #[serde(default)]
    pub notification: NotificationConfig,
    /// Per-document processing configuration
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// Local object store configuration (used when backend = local)
    #[serde(default)]
    pub local: LocalStoreConfig,
    /// GCP object store configuration (required when backend = gcp)
    #[serde(default)]
    pub gcp: Option<GcpConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            backend: BackendProvider::default(),
            environment: default_environment(),
            chunking: ChunkingConfig::default(),
            extraction: ExtractionConfig::default(),
            embedding: EmbeddingConfig::default(),
            index: IndexConfig::default(),
            metadata: MetadataConfig::default(),
            notification: NotificationConfig::default(),
            processing: ProcessingConfig::default(),
            local: LocalStoreConfig::default(),
            gcp: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Vector index name for this environment, e.g. `chunks-prod`
    pub fn index_name(&self) -> String {
        format!("{}-{}", self.index.index_basename, self.environment)
    }

    /// Notification endpoint URL for this environment
    pub fn notification_url(&self) -> String {
        format!(
            "{}/notifications",
            self.notification.base_url.trim_end_matches('/')
        )
    }
}

fn default_environment() -> String {
    "dev".to_string()
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Token budget per chunk (estimated, not exact tokenization)
    pub max_tokens: usize,
    /// Words carried over from the end of one chunk into the next
    pub overlap_words: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 500,
            overlap_words: 50,
        }
    }
}

/// OCR / text extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Base URL of the extraction service
    #[serde(default = "default_extraction_url")]
    pub base_url: String,
    /// Seconds between job status polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Total polling attempts before the job counts as timed out
    /// (60 polls at 5 second intervals = 5 minutes)
    #[serde(default = "default_max_polls")]
    pub max_poll_attempts: u32,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ExtractionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: default_extraction_url(),
            poll_interval_secs: default_poll_interval(),
            max_poll_attempts: default_max_polls(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_extraction_url() -> String {
    "http://localhost:8200".to_string()
}
fn default_poll_interval() -> u64 {
    5
}
fn default_max_polls() -> u32 {
    60
}
fn default_request_timeout() -> u64 {
    120
}

/// Embedding endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (768 for nomic-embed-text)
    pub dimensions: usize,
    /// Retries per chunk before the failure escalates to the document
    pub max_retries: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            max_retries: 2,
            timeout_secs: 60,
        }
    }
}

/// Vector search index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the search cluster
    pub base_url: String,
    /// Index name before the environment suffix is applied
    pub index_basename: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            index_basename: "chunks".to_string(),
        }
    }
}

/// Metadata / lookup store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// SQLite database path
    pub db_path: PathBuf,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("rag-ingest.db"),
        }
    }
}

/// Status notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Base URL of the notification endpoint
    pub base_url: String,
    /// Delivery retries; delivery is best-effort either way
    pub max_retries: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8300".to_string(),
            max_retries: 2,
        }
    }
}

/// Per-document processing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Concurrent chunk writes per document (default: CPU count, max 4)
    pub parallel_chunks: Option<usize>,
}

impl ProcessingConfig {
    /// Resolved chunk-write parallelism
    pub fn effective_parallel_chunks(&self) -> usize {
        self.parallel_chunks
            .unwrap_or_else(|| num_cpus::get().min(4))
            .max(1)
    }
}

/// Backend provider selection for the object store
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Local filesystem object store
    #[default]
    Local,
    /// Google Cloud Storage
    Gcp,
}

/// Google Cloud Platform object store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpConfig {
    /// GCS bucket holding uploaded documents
    pub bucket: String,
}

/// Root directory for the local object store backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStoreConfig {
    pub root: PathBuf,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
        }
    }
}
