//! Integration tests for the full ingestion pipeline.
//!
//! Drives extract -> chunk -> embed -> dual-store write -> status -> notify
//! against in-memory fakes for every provider seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

use rag_ingest::config::PipelineConfig;
use rag_ingest::error::{Error, Result};
use rag_ingest::providers::{
    EmbeddingProvider, JobPoll, JobState, MetadataStore, ObjectStoreProvider, StatusNotifier,
    TextBlock, TextExtractor, VectorIndexProvider,
};
use rag_ingest::storage::RegistryDb;
use rag_ingest::types::{ChunkRecord, DocumentRecord, ExtractionStatus, StorageLocation};
use rag_ingest::{IngestPipeline, ObjectCreatedEvent};

const TEST_DIM: usize = 8;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct MemoryObjectStore {
    objects: HashMap<String, Vec<u8>>,
}

impl MemoryObjectStore {
    fn new(objects: &[(&str, &[u8])]) -> Self {
        Self {
            objects: objects
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_vec()))
                .collect(),
        }
    }
}

#[async_trait]
impl ObjectStoreProvider for MemoryObjectStore {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<u64> {
        self.objects
            .get(&format!("{}/{}", bucket, key))
            .map(|data| data.len() as u64)
            .ok_or_else(|| Error::ObjectStore(format!("no such object {}/{}", bucket, key)))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.objects
            .get(&format!("{}/{}", bucket, key))
            .cloned()
            .ok_or_else(|| Error::ObjectStore(format!("no such object {}/{}", bucket, key)))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

enum OcrMode {
    /// Stay in progress for N polls, then succeed with these lines
    SucceedAfter { polls: u32, lines: Vec<String> },
    /// Never leave IN_PROGRESS
    NeverFinish,
    /// Terminal failure
    Fail,
}

struct FakeExtractor {
    mode: OcrMode,
    polls: Mutex<u32>,
    sync_text: Option<String>,
}

impl FakeExtractor {
    fn ocr(mode: OcrMode) -> Self {
        Self {
            mode,
            polls: Mutex::new(0),
            sync_text: None,
        }
    }

    fn sync(text: &str) -> Self {
        Self {
            mode: OcrMode::NeverFinish,
            polls: Mutex::new(0),
            sync_text: Some(text.to_string()),
        }
    }

    fn polls_made(&self) -> u32 {
        *self.polls.lock()
    }
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn start_job(&self, _location: &StorageLocation) -> Result<String> {
        Ok("job-fake".to_string())
    }

    async fn get_job(&self, _job_id: &str, _next_token: Option<&str>) -> Result<JobPoll> {
        let mut polls = self.polls.lock();
        *polls += 1;
        let poll_number = *polls;

        let (state, blocks) = match &self.mode {
            OcrMode::SucceedAfter { polls, lines } => {
                if poll_number > *polls {
                    (
                        JobState::Succeeded,
                        lines
                            .iter()
                            .map(|l| TextBlock {
                                block_type: "LINE".to_string(),
                                text: l.clone(),
                            })
                            .collect(),
                    )
                } else {
                    (JobState::InProgress, vec![])
                }
            }
            OcrMode::NeverFinish => (JobState::InProgress, vec![]),
            OcrMode::Fail => (JobState::Failed, vec![]),
        };

        Ok(JobPoll {
            state,
            blocks,
            next_token: None,
        })
    }

    async fn analyze_sync(&self, _location: &StorageLocation, _data: &[u8]) -> Result<String> {
        self.sync_text
            .clone()
            .ok_or_else(|| Error::extraction_failed(None, "no sync text configured"))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Deterministic embedder; optionally fails on texts carrying a marker
struct HashEmbedder {
    calls: Mutex<Vec<String>>,
    poison: Option<String>,
}

impl HashEmbedder {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            poison: None,
        }
    }

    fn poisoned(marker: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            poison: Some(marker.to_string()),
        }
    }

    fn calls_for(&self, marker: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|t| t.contains(marker))
            .count()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.lock().push(text.to_string());

        if let Some(marker) = &self.poison {
            if text.contains(marker) {
                return Err(Error::Embedding("embedding endpoint unavailable".to_string()));
            }
        }

        let digest = Sha256::digest(text.as_bytes());
        Ok((0..TEST_DIM)
            .map(|i| (f32::from(digest[i % 32]) / 255.0) - 0.5)
            .collect())
    }

    fn dimensions(&self) -> usize {
        TEST_DIM
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

#[derive(Clone)]
struct VectorRecord {
    id: String,
    document_id: String,
    chunk_index: u32,
    dims: usize,
}

/// In-memory vector index that assigns its own identifiers on write
struct MemoryVectorIndex {
    records: Mutex<Vec<VectorRecord>>,
    next_id: Mutex<u32>,
    ensured_dims: Mutex<Option<usize>>,
}

impl MemoryVectorIndex {
    fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
            ensured_dims: Mutex::new(None),
        }
    }

    fn records_for(&self, document_id: &str) -> Vec<VectorRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.document_id == document_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl VectorIndexProvider for MemoryVectorIndex {
    async fn ensure_index(&self, dimensions: usize) -> Result<()> {
        *self.ensured_dims.lock() = Some(dimensions);
        Ok(())
    }

    async fn index_chunk(&self, chunk: &ChunkRecord, embedding: &[f32]) -> Result<String> {
        let mut next = self.next_id.lock();
        let id = format!("vx-{:06}", *next);
        *next += 1;

        self.records.lock().push(VectorRecord {
            id: id.clone(),
            document_id: chunk.document_id.clone(),
            chunk_index: chunk.chunk_index,
            dims: embedding.len(),
        });

        Ok(id)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Registry wrapper counting terminal status writes per document
struct TrackingMetadata {
    inner: RegistryDb,
    terminal_writes: Mutex<HashMap<String, u32>>,
    fail_chunk_puts: bool,
    /// Simulates an upload-side retention deadline on the document row
    inject_expires_at: Option<DateTime<Utc>>,
}

impl TrackingMetadata {
    fn new() -> Self {
        Self {
            inner: RegistryDb::in_memory().unwrap(),
            terminal_writes: Mutex::new(HashMap::new()),
            fail_chunk_puts: false,
            inject_expires_at: None,
        }
    }

    fn failing_chunk_puts() -> Self {
        Self {
            fail_chunk_puts: true,
            ..Self::new()
        }
    }

    fn with_expiration(expires_at: DateTime<Utc>) -> Self {
        Self {
            inject_expires_at: Some(expires_at),
            ..Self::new()
        }
    }

    fn terminal_writes_for(&self, document_id: &str) -> u32 {
        self.terminal_writes
            .lock()
            .get(document_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl MetadataStore for TrackingMetadata {
    async fn get_document(&self, document_id: &str) -> Result<Option<DocumentRecord>> {
        let mut doc = self.inner.get_document(document_id).await?;
        if let (Some(doc), Some(expires_at)) = (doc.as_mut(), self.inject_expires_at) {
            doc.expires_at = Some(expires_at);
        }
        Ok(doc)
    }

    async fn touch_document(
        &self,
        document_id: &str,
        storage_key: &str,
        tenant_id: &str,
    ) -> Result<()> {
        self.inner
            .touch_document(document_id, storage_key, tenant_id)
            .await
    }

    async fn set_terminal_status(
        &self,
        document_id: &str,
        status: ExtractionStatus,
        file_size: Option<u64>,
        content_hash: Option<&str>,
        processed_at: DateTime<Utc>,
    ) -> Result<()> {
        *self
            .terminal_writes
            .lock()
            .entry(document_id.to_string())
            .or_insert(0) += 1;
        self.inner
            .set_terminal_status(document_id, status, file_size, content_hash, processed_at)
            .await
    }

    async fn put_chunk(&self, chunk: &ChunkRecord) -> Result<()> {
        if self.fail_chunk_puts {
            return Err(Error::metadata_store("simulated chunk write failure"));
        }
        self.inner.put_chunk(chunk).await
    }

    async fn chunks_for_document(&self, document_id: &str) -> Result<Vec<ChunkRecord>> {
        self.inner.chunks_for_document(document_id).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.inner.health_check().await
    }

    fn name(&self) -> &str {
        "tracking"
    }
}

struct RecordingNotifier {
    events: Mutex<Vec<(String, ExtractionStatus)>>,
    fail: bool,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn events(&self) -> Vec<(String, ExtractionStatus)> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl StatusNotifier for RecordingNotifier {
    async fn notify(&self, document_id: &str, status: ExtractionStatus) -> Result<()> {
        if self.fail {
            return Err(Error::Notification("endpoint unreachable".to_string()));
        }
        self.events.lock().push((document_id.to_string(), status));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    pipeline: IngestPipeline,
    extractor: Arc<FakeExtractor>,
    embedder: Arc<HashEmbedder>,
    index: Arc<MemoryVectorIndex>,
    metadata: Arc<TrackingMetadata>,
    notifier: Arc<RecordingNotifier>,
}

fn test_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.extraction.poll_interval_secs = 0;
    config.embedding.max_retries = 0;
    config.processing.parallel_chunks = Some(2);
    config
}

fn harness(
    config: PipelineConfig,
    objects: MemoryObjectStore,
    extractor: FakeExtractor,
    embedder: HashEmbedder,
    metadata: TrackingMetadata,
    notifier: RecordingNotifier,
) -> Harness {
    let extractor = Arc::new(extractor);
    let embedder = Arc::new(embedder);
    let index = Arc::new(MemoryVectorIndex::new());
    let metadata = Arc::new(metadata);
    let notifier = Arc::new(notifier);

    let pipeline = IngestPipeline::new(
        config,
        Arc::new(objects),
        extractor.clone(),
        embedder.clone(),
        index.clone(),
        metadata.clone(),
        notifier.clone(),
    );

    Harness {
        pipeline,
        extractor,
        embedder,
        index,
        metadata,
        notifier,
    }
}

/// Eight 100-word sentences: chunks to exactly four chunks at the default
/// 500-token budget with 50-word overlap.
fn scanned_pdf_lines() -> Vec<String> {
    (0..8)
        .map(|i| {
            let mut words = vec!["ingest"; 99].join(" ");
            words.push_str(&format!(" page{}.", i));
            words
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scanned_pdf_ocr_success_indexes_all_chunks() {
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-1/scan.pdf", b"%PDF-fake-bytes")]),
        FakeExtractor::ocr(OcrMode::SucceedAfter {
            polls: 1,
            lines: scanned_pdf_lines(),
        }),
        HashEmbedder::new(),
        TrackingMetadata::new(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-1/scan.pdf");
    let report = h.pipeline.process_event(&event).await.unwrap();

    assert_eq!(report.status, ExtractionStatus::Completed);
    assert_eq!(report.chunks_indexed, 4);
    assert_eq!(report.file_size, Some(15));
    // Two polling cycles: one in-progress, one succeeded.
    assert_eq!(h.extractor.polls_made(), 2);

    let doc = h.metadata.get_document("doc-1").await.unwrap().unwrap();
    assert_eq!(doc.extraction_status, ExtractionStatus::Completed);
    assert_eq!(doc.file_size, Some(15));
    assert!(doc.processed_at.is_some());

    let chunks = h.metadata.chunks_for_document("doc-1").await.unwrap();
    let indices: Vec<u32> = chunks.iter().map(|c| c.chunk_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
    for chunk in &chunks {
        assert_eq!(chunk.tenant_id, "acme");
        assert_eq!(chunk.source_key, "acme/doc-1/scan.pdf");
        assert!(chunk.token_count > 0);
    }
}

#[tokio::test]
async fn correlation_invariant_holds_between_the_two_stores() {
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-1/scan.pdf", b"%PDF-fake-bytes")]),
        FakeExtractor::ocr(OcrMode::SucceedAfter {
            polls: 0,
            lines: scanned_pdf_lines(),
        }),
        HashEmbedder::new(),
        TrackingMetadata::new(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-1/scan.pdf");
    h.pipeline.process_event(&event).await.unwrap();

    let chunks = h.metadata.chunks_for_document("doc-1").await.unwrap();
    let vectors = h.index.records_for("doc-1");
    assert_eq!(chunks.len(), vectors.len());

    // Every metadata record points at an existing vector record, and every
    // vector record has a metadata counterpart.
    for chunk in &chunks {
        let vector = vectors
            .iter()
            .find(|v| v.id == chunk.vector_index_id)
            .expect("metadata record without vector counterpart");
        assert_eq!(vector.chunk_index, chunk.chunk_index);
        assert_eq!(vector.dims, TEST_DIM);
    }
    for vector in &vectors {
        assert!(
            chunks.iter().any(|c| c.vector_index_id == vector.id),
            "vector record {} has no metadata counterpart",
            vector.id
        );
    }
}

#[tokio::test]
async fn plain_text_single_sentence_yields_one_chunk() {
    let sentence = b"This sentence is exactly fifty characters long OK.";
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-2/note.txt", &sentence[..])]),
        FakeExtractor::ocr(OcrMode::NeverFinish),
        HashEmbedder::new(),
        TrackingMetadata::new(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-2/note.txt");
    let report = h.pipeline.process_event(&event).await.unwrap();

    assert_eq!(report.status, ExtractionStatus::Completed);
    assert_eq!(report.chunks_indexed, 1);
    // The OCR path was never touched.
    assert_eq!(h.extractor.polls_made(), 0);

    let doc = h.metadata.get_document("doc-2").await.unwrap().unwrap();
    assert!(doc.content_hash.is_some());

    let chunks = h.metadata.chunks_for_document("doc-2").await.unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, String::from_utf8_lossy(sentence));
}

#[tokio::test]
async fn word_processor_document_uses_sync_analysis() {
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-3/memo.docx", b"PK-docx-bytes")]),
        FakeExtractor::sync("Quarterly results improved. Margins are stable."),
        HashEmbedder::new(),
        TrackingMetadata::new(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-3/memo.docx");
    let report = h.pipeline.process_event(&event).await.unwrap();

    assert_eq!(report.status, ExtractionStatus::Completed);
    assert_eq!(report.chunks_indexed, 1);
    assert_eq!(h.extractor.polls_made(), 0);
}

#[tokio::test]
async fn stuck_ocr_job_times_out_and_fails_the_document() {
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-4/scan.pdf", b"%PDF-stuck")]),
        FakeExtractor::ocr(OcrMode::NeverFinish),
        HashEmbedder::new(),
        TrackingMetadata::new(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-4/scan.pdf");
    let err = h.pipeline.process_event(&event).await.unwrap_err();
    assert!(matches!(err, Error::ExtractionTimeout { attempts: 60, .. }));
    assert_eq!(h.extractor.polls_made(), 60);

    let doc = h.metadata.get_document("doc-4").await.unwrap().unwrap();
    assert_eq!(doc.extraction_status, ExtractionStatus::Failed);
    assert!(doc.processed_at.is_some());

    assert!(h.metadata.chunks_for_document("doc-4").await.unwrap().is_empty());
    assert!(h.index.records_for("doc-4").is_empty());
}

#[tokio::test]
async fn unsupported_extension_fails_with_true_file_size() {
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-5/photo.bmp", &[0u8; 512][..])]),
        FakeExtractor::ocr(OcrMode::NeverFinish),
        HashEmbedder::new(),
        TrackingMetadata::new(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-5/photo.bmp");
    let err = h.pipeline.process_event(&event).await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedFileType(_)));

    let doc = h.metadata.get_document("doc-5").await.unwrap().unwrap();
    assert_eq!(doc.extraction_status, ExtractionStatus::Failed);
    assert_eq!(doc.file_size, Some(512));
    assert!(doc.processed_at.is_some());
    assert_eq!(
        h.notifier.events(),
        vec![("doc-5".to_string(), ExtractionStatus::Failed)]
    );
}

#[tokio::test]
async fn failed_ocr_job_fails_the_document() {
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-6/scan.jpg", b"jpeg")]),
        FakeExtractor::ocr(OcrMode::Fail),
        HashEmbedder::new(),
        TrackingMetadata::new(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-6/scan.jpg");
    let err = h.pipeline.process_event(&event).await.unwrap_err();
    match err {
        Error::ExtractionFailed { job_id, .. } => {
            assert_eq!(job_id.as_deref(), Some("job-fake"))
        }
        other => panic!("expected ExtractionFailed, got {}", other),
    }

    let doc = h.metadata.get_document("doc-6").await.unwrap().unwrap();
    assert_eq!(doc.extraction_status, ExtractionStatus::Failed);
}

#[tokio::test]
async fn empty_ocr_output_completes_with_zero_chunks() {
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-7/blank.png", b"png")]),
        FakeExtractor::ocr(OcrMode::SucceedAfter {
            polls: 0,
            lines: vec![],
        }),
        HashEmbedder::new(),
        TrackingMetadata::new(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-7/blank.png");
    let report = h.pipeline.process_event(&event).await.unwrap();

    assert_eq!(report.status, ExtractionStatus::Completed);
    assert_eq!(report.chunks_indexed, 0);
    assert!(h.metadata.chunks_for_document("doc-7").await.unwrap().is_empty());
}

#[tokio::test]
async fn embedding_failure_fails_the_document_but_keeps_written_chunks() {
    // Five one-sentence chunks: no overlap, tight budget, sequential writes.
    let mut config = test_config();
    config.chunking.max_tokens = 80;
    config.chunking.overlap_words = 0;
    config.embedding.max_retries = 1;
    config.processing.parallel_chunks = Some(1);

    let sentences: Vec<String> = (0..5)
        .map(|i| {
            let marker = if i == 2 { "POISON" } else { "fine" };
            format!("{} {}.", vec!["chunk"; 39].join(" "), marker)
        })
        .collect();
    let text = sentences.join(" ");

    let h = harness(
        config,
        MemoryObjectStore::new(&[("uploads/acme/doc-8/note.txt", text.as_bytes())]),
        FakeExtractor::ocr(OcrMode::NeverFinish),
        HashEmbedder::poisoned("POISON"),
        TrackingMetadata::new(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-8/note.txt");
    let err = h.pipeline.process_event(&event).await.unwrap_err();
    assert!(matches!(err, Error::Embedding(_)));

    // Retries exhausted: initial attempt plus one retry.
    assert_eq!(h.embedder.calls_for("POISON"), 2);

    let doc = h.metadata.get_document("doc-8").await.unwrap().unwrap();
    assert_eq!(doc.extraction_status, ExtractionStatus::Failed);

    // Chunks that fully completed their three-step write stay in both
    // stores; only the poisoned chunk is missing.
    let chunks = h.metadata.chunks_for_document("doc-8").await.unwrap();
    let indices: Vec<u32> = chunks.iter().map(|c| c.chunk_index).collect();
    assert_eq!(indices, vec![0, 1, 3, 4]);
    assert_eq!(h.index.records_for("doc-8").len(), 4);
}

#[tokio::test]
async fn metadata_write_failure_surfaces_as_correlation_error() {
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-9/note.txt", b"One short sentence.")]),
        FakeExtractor::ocr(OcrMode::NeverFinish),
        HashEmbedder::new(),
        TrackingMetadata::failing_chunk_puts(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-9/note.txt");
    let err = h.pipeline.process_event(&event).await.unwrap_err();
    match err {
        Error::IndexCorrelation {
            document_id,
            chunk_index,
            vector_id,
            ..
        } => {
            assert_eq!(document_id, "doc-9");
            assert_eq!(chunk_index, 0);
            // The orphaned vector id is preserved for reconciliation.
            assert!(vector_id.is_some());
        }
        other => panic!("expected IndexCorrelation, got {}", other),
    }

    let doc = h.metadata.get_document("doc-9").await.unwrap().unwrap();
    assert_eq!(doc.extraction_status, ExtractionStatus::Failed);
    // The vector record exists without a metadata counterpart: exactly the
    // orphan the reconciliation log is for.
    assert_eq!(h.index.records_for("doc-9").len(), 1);
    assert!(h.metadata.chunks_for_document("doc-9").await.unwrap().is_empty());
}

#[tokio::test]
async fn exactly_one_terminal_transition_per_attempt() {
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-10/note.txt", b"A sentence.")]),
        FakeExtractor::ocr(OcrMode::NeverFinish),
        HashEmbedder::new(),
        TrackingMetadata::new(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-10/note.txt");
    h.pipeline.process_event(&event).await.unwrap();

    assert_eq!(h.metadata.terminal_writes_for("doc-10"), 1);
    assert_eq!(
        h.notifier.events(),
        vec![("doc-10".to_string(), ExtractionStatus::Completed)]
    );
}

#[tokio::test]
async fn notification_failure_never_fails_the_pipeline() {
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-11/note.txt", b"A sentence.")]),
        FakeExtractor::ocr(OcrMode::NeverFinish),
        HashEmbedder::new(),
        TrackingMetadata::new(),
        RecordingNotifier::failing(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-11/note.txt");
    let report = h.pipeline.process_event(&event).await.unwrap();
    assert_eq!(report.status, ExtractionStatus::Completed);
}

#[tokio::test]
async fn document_expiration_propagates_into_every_chunk() {
    // A whole-second timestamp survives the storage round trip exactly.
    let expires_at = DateTime::from_timestamp(1_900_000_000, 0).unwrap();
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[("uploads/acme/doc-13/note.txt", b"First point. Second point.")]),
        FakeExtractor::ocr(OcrMode::NeverFinish),
        HashEmbedder::new(),
        TrackingMetadata::with_expiration(expires_at),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-13/note.txt");
    h.pipeline.process_event(&event).await.unwrap();

    let chunks = h.metadata.chunks_for_document("doc-13").await.unwrap();
    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert_eq!(chunk.expires_at, Some(expires_at));
    }
}

#[tokio::test]
async fn missing_object_fails_without_file_size() {
    let h = harness(
        test_config(),
        MemoryObjectStore::new(&[]),
        FakeExtractor::ocr(OcrMode::NeverFinish),
        HashEmbedder::new(),
        TrackingMetadata::new(),
        RecordingNotifier::new(),
    );

    let event = ObjectCreatedEvent::new("uploads", "acme/doc-12/ghost.pdf");
    let err = h.pipeline.process_event(&event).await.unwrap_err();
    assert!(matches!(err, Error::ObjectStore(_)));

    let doc = h.metadata.get_document("doc-12").await.unwrap().unwrap();
    assert_eq!(doc.extraction_status, ExtractionStatus::Failed);
    assert_eq!(doc.file_size, None);
}
