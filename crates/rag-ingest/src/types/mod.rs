//! Core types for the ingestion pipeline

pub mod document;
pub mod event;

pub use document::{ChunkRecord, DocumentRecord, ExtractionStatus};
pub use event::{ObjectCreatedEvent, StorageLocation};
