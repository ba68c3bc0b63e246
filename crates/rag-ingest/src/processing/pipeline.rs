//! The per-document ingest worker
//!
//! One storage event, one invocation: read the object, extract its text,
//! chunk, embed, and write each chunk to both stores, then record exactly one
//! terminal status and emit a best-effort notification. The vector write
//! happens before the metadata write for every chunk; a metadata failure
//! after a successful vector write is logged as a reconciliation candidate
//! with the assigned identifier.

use chrono::Utc;
use futures::future::join_all;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::ingestion::{route, ExtractionStrategy, TokenChunker};
use crate::providers::{
    EmbeddingProvider, MetadataStore, ObjectStoreProvider, StatusNotifier, TextExtractor,
    VectorIndexProvider,
};
use crate::types::{ChunkRecord, ExtractionStatus, ObjectCreatedEvent};

use super::ocr_job::{OcrJobRunner, PollPolicy};

/// Outcome of one processing invocation
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub document_id: String,
    pub tenant_id: String,
    pub status: ExtractionStatus,
    pub chunks_indexed: usize,
    pub file_size: Option<u64>,
}

/// Facts learned during an attempt that must survive into the terminal
/// status write even when the attempt fails
#[derive(Default)]
struct AttemptContext {
    file_size: Option<u64>,
    content_hash: Option<String>,
}

/// Per-document ingest pipeline over the six provider seams
pub struct IngestPipeline {
    config: PipelineConfig,
    chunker: TokenChunker,
    objects: Arc<dyn ObjectStoreProvider>,
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndexProvider>,
    metadata: Arc<dyn MetadataStore>,
    notifier: Arc<dyn StatusNotifier>,
}

impl IngestPipeline {
    /// Create a pipeline from configuration and provider clients
    pub fn new(
        config: PipelineConfig,
        objects: Arc<dyn ObjectStoreProvider>,
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndexProvider>,
        metadata: Arc<dyn MetadataStore>,
        notifier: Arc<dyn StatusNotifier>,
    ) -> Self {
        let chunker = TokenChunker::new(config.chunking.max_tokens, config.chunking.overlap_words);
        Self {
            config,
            chunker,
            objects,
            extractor,
            embedder,
            index,
            metadata,
            notifier,
        }
    }

    fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self.config.extraction.poll_interval(),
            max_attempts: self.config.extraction.max_poll_attempts,
        }
    }

    /// Process one object-created event end to end.
    ///
    /// Exactly one terminal status is written per attempt, with
    /// `processed_at` and whatever file size is known by then; fatal errors
    /// are re-raised after the status write so the caller's own retry or
    /// dead-letter policy still applies.
    pub async fn process_event(&self, event: &ObjectCreatedEvent) -> Result<IngestReport> {
        let document_id = event.document_id()?.to_string();
        let tenant_id = event.tenant_id()?.to_string();

        self.metadata
            .touch_document(&document_id, &event.key, &tenant_id)
            .await?;

        let mut ctx = AttemptContext::default();
        let outcome = self.ingest(event, &document_id, &tenant_id, &mut ctx).await;

        let status = match &outcome {
            Ok(_) => ExtractionStatus::Completed,
            Err(_) => ExtractionStatus::Failed,
        };

        let status_write = self
            .metadata
            .set_terminal_status(
                &document_id,
                status,
                ctx.file_size,
                ctx.content_hash.as_deref(),
                Utc::now(),
            )
            .await;
        if let Err(ref e) = status_write {
            tracing::error!("[{}] Failed to record terminal status: {}", document_id, e);
        }

        self.dispatch_notification(&document_id, status).await;

        match outcome {
            Ok(chunks_indexed) => {
                status_write?;
                tracing::info!(
                    "[{}] COMPLETE: {} chunks indexed",
                    document_id,
                    chunks_indexed
                );
                Ok(IngestReport {
                    document_id,
                    tenant_id,
                    status,
                    chunks_indexed,
                    file_size: ctx.file_size,
                })
            }
            Err(e) => {
                tracing::error!("[{}] FAILED: {}", document_id, e);
                Err(e)
            }
        }
    }

    /// Everything that can fail the document: read, extract, chunk, index
    async fn ingest(
        &self,
        event: &ObjectCreatedEvent,
        document_id: &str,
        tenant_id: &str,
        ctx: &mut AttemptContext,
    ) -> Result<usize> {
        let file_size = self.objects.head_object(&event.bucket, &event.key).await?;
        ctx.file_size = Some(file_size);

        tracing::info!(
            "[{}] Processing {} ({} bytes)",
            document_id,
            event.key,
            file_size
        );

        // Size is recorded before routing, so unsupported types still fail
        // with their true file size.
        let strategy = route(event.extension().as_deref())?;
        let text = self.extract(event, strategy, ctx).await?;

        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            tracing::info!("[{}] No extractable text, completing with zero chunks", document_id);
            return Ok(0);
        }
        tracing::info!("[{}] Created {} chunks, indexing...", document_id, chunks.len());

        self.index.ensure_index(self.embedder.dimensions()).await?;

        let expires_at = self
            .metadata
            .get_document(document_id)
            .await?
            .and_then(|doc| doc.expires_at);

        // Chunks are independent; fan out bounded by the semaphore, but join
        // every in-flight write before deciding the terminal status.
        let semaphore = Arc::new(Semaphore::new(
            self.config.processing.effective_parallel_chunks(),
        ));

        let chunk_futures: Vec<_> = chunks
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                let sem = semaphore.clone();
                async move {
                    let _permit = sem.acquire().await.unwrap();
                    self.write_chunk(
                        document_id,
                        tenant_id,
                        &event.key,
                        index as u32,
                        text,
                        expires_at,
                    )
                    .await
                }
            })
            .collect();

        let results = join_all(chunk_futures).await;

        let mut indexed = 0;
        let mut first_error = None;
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(()) => indexed += 1,
                Err(e) => {
                    tracing::error!("[{}] Chunk {} failed: {}", document_id, index, e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        // Any chunk failure fails the whole document; chunks already written
        // in full (vector + metadata) stay in the stores.
        if let Some(e) = first_error {
            return Err(e);
        }

        Ok(indexed)
    }

    /// Run the selected extraction strategy
    async fn extract(
        &self,
        event: &ObjectCreatedEvent,
        strategy: ExtractionStrategy,
        ctx: &mut AttemptContext,
    ) -> Result<String> {
        let location = event.location();

        match strategy {
            ExtractionStrategy::AsyncOcr => {
                let runner = OcrJobRunner::new(self.extractor.clone(), self.poll_policy());
                runner.run(&location).await
            }
            ExtractionStrategy::SyncAnalysis => {
                let data = self.objects.get_object(&event.bucket, &event.key).await?;
                ctx.content_hash = Some(hex_sha256(&data));
                self.extractor.analyze_sync(&location, &data).await
            }
            ExtractionStrategy::PlainText => {
                let data = self.objects.get_object(&event.bucket, &event.key).await?;
                ctx.content_hash = Some(hex_sha256(&data));
                String::from_utf8(data).map_err(|e| {
                    Error::extraction_failed(None, format!("Object is not valid UTF-8: {}", e))
                })
            }
        }
    }

    /// The three-step chunk write: embed, vector write capturing the
    /// assigned id, then the metadata write that finalizes the pair
    async fn write_chunk(
        &self,
        document_id: &str,
        tenant_id: &str,
        source_key: &str,
        chunk_index: u32,
        text: String,
        expires_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<()> {
        let embedding = self.embed_with_retry(&text, document_id, chunk_index).await?;

        let token_count = TokenChunker::estimate_tokens(&text) as u32;
        let mut record = ChunkRecord {
            document_id: document_id.to_string(),
            chunk_index,
            text,
            tenant_id: tenant_id.to_string(),
            source_key: source_key.to_string(),
            vector_index_id: String::new(),
            token_count,
            created_at: Utc::now(),
            expires_at,
        };

        let vector_id = self.index.index_chunk(&record, &embedding).await?;
        record.vector_index_id = vector_id.clone();

        if let Err(e) = self.metadata.put_chunk(&record).await {
            // The vector record exists but nothing points at it. Not retried
            // here: a blind retry risks a duplicate vector record. Offline
            // reconciliation picks these up from the log.
            tracing::error!(
                "[{}] RECONCILE chunk {} vector_index_id={}: metadata write failed after vector write: {}",
                document_id,
                chunk_index,
                vector_id,
                e
            );
            return Err(Error::IndexCorrelation {
                document_id: document_id.to_string(),
                chunk_index,
                vector_id: Some(vector_id),
                message: format!("metadata write failed after vector write: {}", e),
            });
        }

        Ok(())
    }

    /// Embed one chunk, retrying transient failures with exponential backoff
    async fn embed_with_retry(
        &self,
        text: &str,
        document_id: &str,
        chunk_index: u32,
    ) -> Result<Vec<f32>> {
        let max_retries = self.config.embedding.max_retries;
        let mut delay = Duration::from_millis(200);
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match self.embedder.embed(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    tracing::warn!(
                        "[{}] Embedding attempt {} for chunk {} failed: {}",
                        document_id,
                        attempt + 1,
                        chunk_index,
                        e
                    );
                    last_error = Some(e);
                    if attempt < max_retries {
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::embedding("embedding failed")))
    }

    /// Best-effort status notification; failures never fail the pipeline
    async fn dispatch_notification(&self, document_id: &str, status: ExtractionStatus) {
        if let Err(e) = self.notifier.notify(document_id, status).await {
            tracing::warn!("[{}] Notification delivery failed: {}", document_id, e);
        }
    }

    /// Health of every provider seam, for the CLI health command
    pub async fn health_report(&self) -> Vec<(String, bool)> {
        let mut report = Vec::new();
        report.push((
            format!("object-store/{}", self.objects.name()),
            self.objects.health_check().await.unwrap_or(false),
        ));
        report.push((
            format!("extractor/{}", self.extractor.name()),
            self.extractor.health_check().await.unwrap_or(false),
        ));
        report.push((
            format!("embedding/{}", self.embedder.name()),
            self.embedder.health_check().await.unwrap_or(false),
        ));
        report.push((
            format!("vector-index/{}", self.index.name()),
            self.index.health_check().await.unwrap_or(false),
        ));
        report.push((
            format!("metadata/{}", self.metadata.name()),
            self.metadata.health_check().await.unwrap_or(false),
        ));
        report
    }
}

fn hex_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
