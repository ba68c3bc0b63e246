//! Text extraction provider trait: asynchronous OCR jobs and synchronous
//! document analysis

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::StorageLocation;

/// State reported by the extraction service for an asynchronous job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    NotStarted,
    InProgress,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// One text block from a result page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    /// Block granularity as reported by the service ("LINE", "WORD", "PAGE")
    pub block_type: String,
    /// Text content of the block
    pub text: String,
}

impl TextBlock {
    pub fn is_line(&self) -> bool {
        self.block_type.eq_ignore_ascii_case("LINE")
    }
}

/// One poll of an asynchronous job: current state plus, once terminal, a
/// page of result blocks and the continuation token for the next page
#[derive(Debug, Clone)]
pub struct JobPoll {
    pub state: JobState,
    pub blocks: Vec<TextBlock>,
    pub next_token: Option<String>,
}

/// Trait for the external OCR / document-analysis service
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Submit an asynchronous extraction job; returns an opaque job id
    async fn start_job(&self, location: &StorageLocation) -> Result<String>;

    /// Fetch job status and, when available, a page of results
    async fn get_job(&self, job_id: &str, next_token: Option<&str>) -> Result<JobPoll>;

    /// Synchronous single request/response analysis (word-processor path)
    async fn analyze_sync(&self, location: &StorageLocation, data: &[u8]) -> Result<String>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
