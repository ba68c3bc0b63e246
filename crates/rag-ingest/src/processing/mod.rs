//! Per-document processing: OCR orchestration and the ingest worker

mod ocr_job;
mod pipeline;

pub use ocr_job::{OcrJobRunner, PollPolicy};
pub use pipeline::{IngestPipeline, IngestReport};
