//! Document and chunk records tracked across the two stores

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Width of the zero-padded chunk sort key.
///
/// A 500-token chunk budget makes more than 9999 chunks per document
/// unrealistic; the padding only has to keep lexicographic order sortable.
const SORT_KEY_WIDTH: usize = 4;

/// Processing status of a document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// Uploaded, not yet picked up
    Pending,
    /// A worker is currently extracting and indexing
    Processing,
    /// All chunks embedded and indexed
    Completed,
    /// Unrecoverable error; see logs for the cause
    Failed,
}

impl ExtractionStatus {
    /// Whether this status is terminal for a processing attempt
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Wire/storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::str::FromStr for ExtractionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown extraction status: {}", other)),
        }
    }
}

/// One uploaded file, as tracked in the metadata store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Document identity, the second path segment of the storage key
    pub document_id: String,
    /// Location of the source bytes
    pub storage_key: String,
    /// Owning tenant, the first path segment of the storage key
    pub tenant_id: String,
    /// Current processing status
    pub extraction_status: ExtractionStatus,
    /// Source size in bytes, set once known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// SHA-256 of the source bytes, when they passed through the pipeline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Retention deadline, propagated into every chunk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Set exactly when the status becomes terminal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

/// One unit of extracted text, owned exclusively by its document.
///
/// A chunk record must never exist without a vector-store record bearing the
/// same `vector_index_id`; the vector write happens first and the metadata
/// write finalizes the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Parent document
    pub document_id: String,
    /// Position within the document, zero-based
    pub chunk_index: u32,
    /// Chunk text, bounded by the chunking policy
    pub text: String,
    /// Owning tenant, partitions retrieval
    pub tenant_id: String,
    /// Storage key of the source object
    pub source_key: String,
    /// Identifier assigned by the vector store at write time; the
    /// correlation key between the two stores
    pub vector_index_id: String,
    /// Approximate token count, for budgeting
    pub token_count: u32,
    /// When the pair was finalized
    pub created_at: DateTime<Utc>,
    /// Retention deadline inherited from the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ChunkRecord {
    /// Zero-padded sort key; together with `document_id` this forms the
    /// composite, lexicographically sortable chunk identity.
    pub fn sort_key(&self) -> String {
        Self::sort_key_for(self.chunk_index)
    }

    /// Render a chunk index as a sort key
    pub fn sort_key_for(chunk_index: u32) -> String {
        format!("{:0width$}", chunk_index, width = SORT_KEY_WIDTH)
    }
}
