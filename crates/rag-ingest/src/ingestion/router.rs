//! Routes a file to an extraction strategy based on its extension

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a file's text gets extracted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Asynchronous OCR job with polling (scans and PDFs)
    AsyncOcr,
    /// Single request/response document analysis (word-processor formats)
    SyncAnalysis,
    /// Direct byte read, decoded as UTF-8
    PlainText,
}

/// Select the extraction strategy for a file extension.
///
/// Anything outside the known sets is `UnsupportedFileType`; the caller is
/// still expected to mark the document failed with its true file size, which
/// is known before extraction starts.
pub fn route(extension: Option<&str>) -> Result<ExtractionStrategy> {
    let ext = extension.unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "pdf" | "png" | "jpg" | "jpeg" => Ok(ExtractionStrategy::AsyncOcr),
        "docx" | "doc" => Ok(ExtractionStrategy::SyncAnalysis),
        "txt" => Ok(ExtractionStrategy::PlainText),
        other => Err(Error::UnsupportedFileType(if other.is_empty() {
            "(no extension)".to_string()
        } else {
            other.to_string()
        })),
    }
}
