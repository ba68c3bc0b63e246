//! SQLite registry for document status and finalized chunk records
//!
//! The lookup side of the dual store: status reporting reads this, and
//! retrieval joins chunk rows back to vector records through the
//! store-assigned `vector_index_id`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::metadata_store::MetadataStore;
use crate::types::{ChunkRecord, DocumentRecord, ExtractionStatus};

/// SQLite-based registry database
pub struct RegistryDb {
    conn: Arc<Mutex<Connection>>,
}

impl RegistryDb {
    /// Create or open the database at the given path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::MetadataStore(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::MetadataStore(format!("Failed to open in-memory database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
        "#,
        )
        .map_err(|e| Error::MetadataStore(format!("Failed to set pragmas: {}", e)))?;

        conn.execute_batch(
            r#"
            -- Documents table: one row per uploaded file
            CREATE TABLE IF NOT EXISTS documents (
                document_id TEXT PRIMARY KEY,
                storage_key TEXT NOT NULL,
                tenant_id TEXT NOT NULL,
                extraction_status TEXT NOT NULL,
                file_size INTEGER,
                content_hash TEXT,
                expires_at TEXT,
                processed_at TEXT,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(extraction_status);
            CREATE INDEX IF NOT EXISTS idx_documents_tenant ON documents(tenant_id);

            -- Chunks table: composite key of document and zero-padded index
            CREATE TABLE IF NOT EXISTS chunks (
                document_id TEXT NOT NULL,
                sort_key TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                text TEXT NOT NULL,
                tenant_id TEXT NOT NULL,
                source_key TEXT NOT NULL,
                vector_index_id TEXT NOT NULL,
                token_count INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT,
                PRIMARY KEY (document_id, sort_key)
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_tenant ON chunks(tenant_id);
            CREATE INDEX IF NOT EXISTS idx_chunks_vector_id ON chunks(vector_index_id);
        "#,
        )
        .map_err(|e| Error::MetadataStore(format!("Failed to run migrations: {}", e)))?;

        tracing::debug!("Registry migrations complete");
        Ok(())
    }

    fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRecord> {
        let status: String = row.get("extraction_status")?;
        Ok(DocumentRecord {
            document_id: row.get("document_id")?,
            storage_key: row.get("storage_key")?,
            tenant_id: row.get("tenant_id")?,
            extraction_status: status.parse().unwrap_or(ExtractionStatus::Pending),
            file_size: row.get::<_, Option<i64>>("file_size")?.map(|s| s as u64),
            content_hash: row.get("content_hash")?,
            expires_at: row.get("expires_at")?,
            processed_at: row.get("processed_at")?,
        })
    }

    fn row_to_chunk(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChunkRecord> {
        Ok(ChunkRecord {
            document_id: row.get("document_id")?,
            chunk_index: row.get::<_, i64>("chunk_index")? as u32,
            text: row.get("text")?,
            tenant_id: row.get("tenant_id")?,
            source_key: row.get("source_key")?,
            vector_index_id: row.get("vector_index_id")?,
            token_count: row.get::<_, i64>("token_count")? as u32,
            created_at: row.get("created_at")?,
            expires_at: row.get("expires_at")?,
        })
    }
}

#[async_trait]
impl MetadataStore for RegistryDb {
    async fn get_document(&self, document_id: &str) -> Result<Option<DocumentRecord>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT * FROM documents WHERE document_id = ?1",
            params![document_id],
            Self::row_to_document,
        )
        .optional()
        .map_err(|e| Error::MetadataStore(format!("Failed to load document: {}", e)))
    }

    async fn touch_document(
        &self,
        document_id: &str,
        storage_key: &str,
        tenant_id: &str,
    ) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"INSERT OR IGNORE INTO documents
               (document_id, storage_key, tenant_id, extraction_status, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                document_id,
                storage_key,
                tenant_id,
                ExtractionStatus::Pending.as_str(),
                Utc::now()
            ],
        )
        .map_err(|e| Error::MetadataStore(format!("Failed to touch document: {}", e)))?;
        Ok(())
    }

    async fn set_terminal_status(
        &self,
        document_id: &str,
        status: ExtractionStatus,
        file_size: Option<u64>,
        content_hash: Option<&str>,
        processed_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock();
        let updated = conn
            .execute(
                r#"UPDATE documents SET
                   extraction_status = ?2,
                   file_size = COALESCE(?3, file_size),
                   content_hash = COALESCE(?4, content_hash),
                   processed_at = ?5,
                   updated_at = ?6
                   WHERE document_id = ?1"#,
                params![
                    document_id,
                    status.as_str(),
                    file_size.map(|s| s as i64),
                    content_hash,
                    processed_at,
                    Utc::now()
                ],
            )
            .map_err(|e| Error::MetadataStore(format!("Failed to update status: {}", e)))?;

        if updated == 0 {
            return Err(Error::MetadataStore(format!(
                "No document row for {}",
                document_id
            )));
        }
        Ok(())
    }

    async fn put_chunk(&self, chunk: &ChunkRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"INSERT OR REPLACE INTO chunks
               (document_id, sort_key, chunk_index, text, tenant_id, source_key,
                vector_index_id, token_count, created_at, expires_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
            params![
                chunk.document_id,
                chunk.sort_key(),
                chunk.chunk_index as i64,
                chunk.text,
                chunk.tenant_id,
                chunk.source_key,
                chunk.vector_index_id,
                chunk.token_count as i64,
                chunk.created_at,
                chunk.expires_at
            ],
        )
        .map_err(|e| Error::MetadataStore(format!("Failed to write chunk record: {}", e)))?;
        Ok(())
    }

    async fn chunks_for_document(&self, document_id: &str) -> Result<Vec<ChunkRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT * FROM chunks WHERE document_id = ?1 ORDER BY sort_key")
            .map_err(|e| Error::MetadataStore(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![document_id], Self::row_to_chunk)
            .map_err(|e| Error::MetadataStore(format!("Failed to load chunks: {}", e)))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::MetadataStore(format!("Failed to read chunk row: {}", e)))
    }

    async fn health_check(&self) -> Result<bool> {
        let conn = self.conn.lock();
        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| Error::MetadataStore(format!("Health check failed: {}", e)))?;
        Ok(true)
    }

    fn name(&self) -> &str {
        "sqlite-registry"
    }
}
