//! Metadata store trait: the operational lookup side of the dual store

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{ChunkRecord, DocumentRecord, ExtractionStatus};

/// Trait for the metadata / lookup store.
///
/// This is the single source of truth for document status; the UI polls it
/// independently of notification delivery.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Fetch a document record
    async fn get_document(&self, document_id: &str) -> Result<Option<DocumentRecord>>;

    /// Create the document row if it does not exist yet (status `pending`).
    ///
    /// Upload-side record creation is an external concern; touching the row
    /// here guarantees terminal status writes always have a row to land on.
    async fn touch_document(
        &self,
        document_id: &str,
        storage_key: &str,
        tenant_id: &str,
    ) -> Result<()>;

    /// Record a terminal status together with `processed_at` and whatever
    /// file size and content hash are known by then
    async fn set_terminal_status(
        &self,
        document_id: &str,
        status: ExtractionStatus,
        file_size: Option<u64>,
        content_hash: Option<&str>,
        processed_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Write a finalized chunk record (vector id already assigned)
    async fn put_chunk(&self, chunk: &ChunkRecord) -> Result<()>;

    /// All chunk records for a document, in chunk order
    async fn chunks_for_document(&self, document_id: &str) -> Result<Vec<ChunkRecord>>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
