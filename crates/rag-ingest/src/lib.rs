//! rag-ingest: document ingestion and vector-indexing pipeline
//!
//! Turns an uploaded file (PDF, scan, word-processor document, or plain
//! text) into embedding-indexed, token-bounded text chunks. Extraction runs
//! through an external OCR / analysis service, and every chunk is written to
//! two stores: the vector index (which assigns the identifier) and the
//! metadata registry (which persists that identifier as the correlation key
//! used by status reporting and retrieval joins).

pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod storage;
pub mod types;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use processing::{IngestPipeline, IngestReport, OcrJobRunner, PollPolicy};
pub use types::{ChunkRecord, DocumentRecord, ExtractionStatus, ObjectCreatedEvent};
