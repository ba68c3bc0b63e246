//! Document ingestion: extraction routing and text chunking

mod chunker;
mod router;

pub use chunker::TokenChunker;
pub use router::{route, ExtractionStrategy};
