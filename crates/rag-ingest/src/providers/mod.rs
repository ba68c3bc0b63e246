//! Provider abstractions for the pipeline's external collaborators
//!
//! Trait-based seams for the object store, text extraction service,
//! embedding endpoint, vector index, metadata store, and notification
//! endpoint, so the pipeline can be driven against fakes in tests and
//! against local or cloud backends in deployment.

pub mod embedding;
pub mod metadata_store;
pub mod notifier;
pub mod object_store;
pub mod ocr;
pub mod vector_index;

pub mod local;
pub mod ocr_http;
pub mod ollama;
pub mod search_index;

#[cfg(feature = "gcp")]
pub mod gcs;

pub use embedding::EmbeddingProvider;
pub use metadata_store::MetadataStore;
pub use notifier::StatusNotifier;
pub use object_store::ObjectStoreProvider;
pub use ocr::{JobPoll, JobState, TextBlock, TextExtractor};
pub use vector_index::VectorIndexProvider;
