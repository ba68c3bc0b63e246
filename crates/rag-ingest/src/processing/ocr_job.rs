//! Asynchronous OCR job orchestration
//!
//! Drives one external extraction job through
//! `NOT_STARTED -> IN_PROGRESS -> {SUCCEEDED, FAILED}` with a fixed poll
//! interval and a hard attempt cap; exceeding the cap is a `TIMED_OUT`
//! outcome owned by the orchestrator, not the service. The poll delay comes
//! from `PollPolicy` so tests can run the machine with zero-length waits.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::providers::ocr::{JobState, TextExtractor};
use crate::types::StorageLocation;

/// Polling policy for asynchronous extraction jobs
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay between status polls
    pub interval: Duration,
    /// Total polls before the job counts as timed out
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        // 60 polls at 5 second intervals: five minutes end to end.
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// Runs one OCR job to completion and collects its text
pub struct OcrJobRunner {
    extractor: Arc<dyn TextExtractor>,
    policy: PollPolicy,
}

impl OcrJobRunner {
    /// Create a runner over an extraction service
    pub fn new(extractor: Arc<dyn TextExtractor>, policy: PollPolicy) -> Self {
        Self { extractor, policy }
    }

    /// Start a job for the given source and poll it to a terminal state.
    ///
    /// Returns the concatenated line-level text. Empty output is valid: a
    /// blank scanned page succeeds with zero lines.
    pub async fn run(&self, location: &StorageLocation) -> Result<String> {
        let job_id = self.extractor.start_job(location).await?;

        for attempt in 1..=self.policy.max_attempts {
            let poll = self.extractor.get_job(&job_id, None).await?;

            match poll.state {
                JobState::Succeeded => {
                    tracing::info!(
                        "[{}] Job {} succeeded after {} polls",
                        location,
                        job_id,
                        attempt
                    );
                    return self.collect(&job_id, poll.blocks, poll.next_token).await;
                }
                JobState::Failed => {
                    return Err(Error::extraction_failed(
                        Some(job_id.clone()),
                        "extraction service reported job failure",
                    ));
                }
                JobState::NotStarted | JobState::InProgress => {
                    tracing::debug!("[{}] Job {} still running (poll {})", location, job_id, attempt);
                    tokio::time::sleep(self.policy.interval).await;
                }
            }
        }

        Err(Error::ExtractionTimeout {
            job_id,
            attempts: self.policy.max_attempts,
        })
    }

    /// Drain all result pages, concatenating line blocks in service order,
    /// each followed by a newline.
    async fn collect(
        &self,
        job_id: &str,
        first_blocks: Vec<crate::providers::ocr::TextBlock>,
        mut next_token: Option<String>,
    ) -> Result<String> {
        let mut text = String::new();
        let mut append = |blocks: Vec<crate::providers::ocr::TextBlock>| {
            for block in blocks {
                if block.is_line() {
                    text.push_str(&block.text);
                    text.push('\n');
                }
            }
        };

        append(first_blocks);

        while let Some(token) = next_token.take() {
            let page = self.extractor.get_job(job_id, Some(&token)).await?;
            append(page.blocks);
            next_token = page.next_token;
        }

        Ok(text)
    }
}
