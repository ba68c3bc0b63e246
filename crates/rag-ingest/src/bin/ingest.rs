//! CLI entry point: process one object-created event, or probe provider
//! health, using providers wired from a TOML config file.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use rag_ingest::config::{BackendProvider, PipelineConfig};
use rag_ingest::providers::local::LocalObjectStore;
use rag_ingest::providers::notifier::HttpNotifier;
use rag_ingest::providers::ocr_http::HttpOcrClient;
use rag_ingest::providers::ollama::OllamaEmbedder;
use rag_ingest::providers::search_index::HttpSearchIndex;
use rag_ingest::providers::ObjectStoreProvider;
use rag_ingest::storage::RegistryDb;
use rag_ingest::{IngestPipeline, ObjectCreatedEvent};

#[derive(Parser)]
#[command(name = "rag-ingest", about = "Document ingestion and vector-indexing pipeline")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "rag-ingest.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a single object-created event
    Process {
        /// Bucket holding the uploaded object
        #[arg(long)]
        bucket: String,
        /// Object key, following the tenant/document/filename convention
        #[arg(long)]
        key: String,
    },
    /// Probe every provider seam and report health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        PipelineConfig::from_toml_file(&cli.config)
            .with_context(|| format!("loading config {}", cli.config.display()))?
    } else {
        tracing::warn!("Config {} not found, using defaults", cli.config.display());
        PipelineConfig::default()
    };

    let pipeline = build_pipeline(&config).await?;

    match cli.command {
        Command::Process { bucket, key } => {
            let event = ObjectCreatedEvent::new(bucket, key);
            let report = pipeline.process_event(&event).await?;
            println!(
                "{} -> {:?} ({} chunks, {} bytes)",
                report.document_id,
                report.status,
                report.chunks_indexed,
                report.file_size.unwrap_or(0)
            );
        }
        Command::Health => {
            let mut healthy = true;
            for (name, ok) in pipeline.health_report().await {
                println!("{:<24} {}", name, if ok { "ok" } else { "UNAVAILABLE" });
                healthy &= ok;
            }
            if !healthy {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn build_pipeline(config: &PipelineConfig) -> anyhow::Result<IngestPipeline> {
    let objects: Arc<dyn ObjectStoreProvider> = match config.backend {
        BackendProvider::Local => Arc::new(LocalObjectStore::new(config.local.root.clone())),
        BackendProvider::Gcp => gcp_object_store(config).await?,
    };

    let extractor = Arc::new(HttpOcrClient::new(&config.extraction));
    let embedder = Arc::new(OllamaEmbedder::new(&config.embedding));
    let index = Arc::new(HttpSearchIndex::new(&config.index, config.index_name()));
    let metadata = Arc::new(RegistryDb::new(&config.metadata.db_path)?);
    let notifier = Arc::new(HttpNotifier::new(
        config.notification_url(),
        &config.notification,
    ));

    Ok(IngestPipeline::new(
        config.clone(),
        objects,
        extractor,
        embedder,
        index,
        metadata,
        notifier,
    ))
}

#[cfg(feature = "gcp")]
async fn gcp_object_store(config: &PipelineConfig) -> anyhow::Result<Arc<dyn ObjectStoreProvider>> {
    let gcp = config
        .gcp
        .as_ref()
        .context("backend = gcp requires a [gcp] config section")?;
    Ok(Arc::new(
        rag_ingest::providers::gcs::GcsObjectStore::new(gcp.bucket.clone()).await?,
    ))
}

#[cfg(not(feature = "gcp"))]
async fn gcp_object_store(_config: &PipelineConfig) -> anyhow::Result<Arc<dyn ObjectStoreProvider>> {
    anyhow::bail!("backend = gcp requires building with the `gcp` feature")
}
