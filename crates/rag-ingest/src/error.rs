//! Error types for the ingestion pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ingestion pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File extension not handled by any extraction strategy
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Object store error
    #[error("Object store error: {0}")]
    ObjectStore(String),

    /// Text extraction job finished in a failed state, or could not run
    #[error("Extraction failed (job {}): {}", .job_id.as_deref().unwrap_or("none"), .message)]
    ExtractionFailed {
        job_id: Option<String>,
        message: String,
    },

    /// Text extraction job did not reach a terminal state within the poll budget
    #[error("Extraction timed out for job {job_id} after {attempts} polls")]
    ExtractionTimeout { job_id: String, attempts: u32 },

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("Vector index error: {0}")]
    VectorDb(String),

    /// Vector write and metadata record disagree; needs offline reconciliation
    #[error("Index correlation error for document {document_id} chunk {chunk_index}: {message}")]
    IndexCorrelation {
        document_id: String,
        chunk_index: u32,
        vector_id: Option<String>,
        message: String,
    },

    /// Metadata store error
    #[error("Metadata store error: {0}")]
    MetadataStore(String),

    /// Notification delivery error (never fatal to the pipeline)
    #[error("Notification error: {0}")]
    Notification(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction failure error
    pub fn extraction_failed(job_id: Option<String>, message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            job_id,
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector index error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// Create a metadata store error
    pub fn metadata_store(message: impl Into<String>) -> Self {
        Self::MetadataStore(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
