//! Status notification: a best-effort side channel
//!
//! Delivery failures are logged and swallowed by the pipeline; authoritative
//! state lives in the metadata store.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::config::NotificationConfig;
use crate::error::{Error, Result};
use crate::types::ExtractionStatus;

/// Trait for the external status notification endpoint
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    /// Deliver a status-change event
    async fn notify(&self, document_id: &str, status: ExtractionStatus) -> Result<()>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// HTTP notifier posting `{documentId, status}` to the subscriber system
pub struct HttpNotifier {
    client: Client,
    url: String,
    max_retries: u32,
}

impl HttpNotifier {
    /// Create a notifier for the configured endpoint URL
    pub fn new(url: String, config: &NotificationConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url,
            max_retries: config.max_retries,
        }
    }

    async fn post_once(&self, document_id: &str, status: ExtractionStatus) -> Result<()> {
        let body = json!({
            "documentId": document_id,
            "status": status.as_str(),
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Notification(format!("Notification request failed: {}", e)))?;

        if !response.status().is_success() {
            let status_code = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Notification(format!(
                "Notification endpoint returned {}: {}",
                status_code, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl StatusNotifier for HttpNotifier {
    async fn notify(&self, document_id: &str, status: ExtractionStatus) -> Result<()> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            match self.post_once(document_id, status).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!(
                        "[{}] Notification attempt {} failed: {}",
                        document_id,
                        attempt + 1,
                        e
                    );
                    last_err = Some(e);
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(250)).await;
                    }
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::Notification("Notification failed".to_string())))
    }

    fn name(&self) -> &str {
        "http"
    }
}
