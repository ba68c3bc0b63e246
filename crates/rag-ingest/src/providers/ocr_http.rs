//! HTTP client for the external OCR / document-analysis service
//!
//! The service runs text detection as an asynchronous job against a storage
//! location: submit, poll, then page through line-level result blocks via a
//! continuation token. Word-processor formats go through a synchronous
//! analysis call instead, with the payload inlined base64.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::types::StorageLocation;

use super::ocr::{JobPoll, JobState, TextBlock, TextExtractor};

/// HTTP OCR / document-analysis client
pub struct HttpOcrClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartJobRequest<'a> {
    source: SourceLocation<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceLocation<'a> {
    bucket: &'a str,
    key: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartJobResponse {
    job_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatusResponse {
    status: JobState,
    #[serde(default)]
    blocks: Vec<BlockPayload>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockPayload {
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    content: String,
    mime_type: &'a str,
    source_key: &'a str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    text: String,
}

impl HttpOcrClient {
    /// Create a client for the configured extraction service
    pub fn new(config: &ExtractionConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn mime_type(key: &str) -> &'static str {
        match key.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("doc") => "application/msword",
            _ => "application/octet-stream",
        }
    }
}

#[async_trait]
impl TextExtractor for HttpOcrClient {
    async fn start_job(&self, location: &StorageLocation) -> Result<String> {
        let request = StartJobRequest {
            source: SourceLocation {
                bucket: &location.bucket,
                key: &location.key,
            },
        };

        let response = self
            .client
            .post(format!("{}/v1/jobs", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::extraction_failed(None, format!("Job submission failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::extraction_failed(
                None,
                format!("Job submission failed ({}): {}", status, body),
            ));
        }

        let started: StartJobResponse = response.json().await.map_err(|e| {
            Error::extraction_failed(None, format!("Failed to parse job submission response: {}", e))
        })?;

        tracing::info!("[{}] Started extraction job {}", location, started.job_id);
        Ok(started.job_id)
    }

    async fn get_job(&self, job_id: &str, next_token: Option<&str>) -> Result<JobPoll> {
        let mut request = self
            .client
            .get(format!("{}/v1/jobs/{}", self.base_url, job_id));
        if let Some(token) = next_token {
            request = request.query(&[("nextToken", token)]);
        }

        let response = request.send().await.map_err(|e| {
            Error::extraction_failed(Some(job_id.to_string()), format!("Job poll failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::extraction_failed(
                Some(job_id.to_string()),
                format!("Job poll failed ({}): {}", status, body),
            ));
        }

        let payload: JobStatusResponse = response.json().await.map_err(|e| {
            Error::extraction_failed(
                Some(job_id.to_string()),
                format!("Failed to parse job status: {}", e),
            )
        })?;

        Ok(JobPoll {
            state: payload.status,
            blocks: payload
                .blocks
                .into_iter()
                .map(|b| TextBlock {
                    block_type: b.block_type,
                    text: b.text,
                })
                .collect(),
            next_token: payload.next_token,
        })
    }

    async fn analyze_sync(&self, location: &StorageLocation, data: &[u8]) -> Result<String> {
        let request = AnalyzeRequest {
            content: BASE64.encode(data),
            mime_type: Self::mime_type(&location.key),
            source_key: &location.key,
        };

        let response = self
            .client
            .post(format!("{}/v1/analyze", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::extraction_failed(None, format!("Analysis request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::extraction_failed(
                None,
                format!("Analysis failed ({}): {}", status, body),
            ));
        }

        let analyzed: AnalyzeResponse = response.json().await.map_err(|e| {
            Error::extraction_failed(None, format!("Failed to parse analysis response: {}", e))
        })?;

        Ok(analyzed.text)
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map_err(|e| Error::extraction_failed(None, format!("Health check failed: {}", e)))?;
        Ok(response.status().is_success())
    }

    fn name(&self) -> &str {
        "http-ocr"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types_for_word_processor_formats() {
        assert_eq!(
            HttpOcrClient::mime_type("acme/doc-1/report.docx"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(HttpOcrClient::mime_type("acme/doc-1/old.doc"), "application/msword");
        assert_eq!(
            HttpOcrClient::mime_type("acme/doc-1/unknown"),
            "application/octet-stream"
        );
    }
}
