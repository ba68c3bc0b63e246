//! Vector index provider trait for schema bootstrap and chunk writes

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ChunkRecord;

/// Trait for the vector search index
///
/// The store assigns document identifiers on write; the assigned id is the
/// correlation key persisted in the metadata record.
#[async_trait]
pub trait VectorIndexProvider: Send + Sync {
    /// Ensure the target index exists with the expected schema.
    ///
    /// Idempotent: an index that already exists is success, not an error.
    async fn ensure_index(&self, dimensions: usize) -> Result<()>;

    /// Write one chunk with its embedding, without a client-supplied id,
    /// and return the identifier the store assigned.
    ///
    /// A write the store accepts without returning an identifier is an
    /// `IndexCorrelation` error: an uncorrelatable vector record is worse
    /// than no record.
    async fn index_chunk(&self, chunk: &ChunkRecord, embedding: &[f32]) -> Result<String>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
