//! Local filesystem object store
//!
//! Maps `{bucket}/{key}` onto a directory tree under a configured root.
//! The default backend for development and smoke runs.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::object_store::ObjectStoreProvider;

/// Filesystem-backed object store
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        // Object keys are forward-slash paths; refuse anything that would
        // escape the root.
        if key.split('/').any(|seg| seg == "..") || bucket.contains("..") {
            return Err(Error::ObjectStore(format!(
                "Refusing traversal in object path {}/{}",
                bucket, key
            )));
        }
        let mut path = self.root.join(bucket);
        for segment in key.split('/') {
            path.push(segment);
        }
        Ok(path)
    }
}

#[async_trait]
impl ObjectStoreProvider for LocalObjectStore {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<u64> {
        let path = self.object_path(bucket, key)?;
        let meta = tokio::fs::metadata(&path).await.map_err(|e| {
            Error::ObjectStore(format!("Failed to stat {}: {}", path.display(), e))
        })?;
        Ok(meta.len())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        tokio::fs::read(&path).await.map_err(|e| {
            Error::ObjectStore(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(Path::new(&self.root).is_dir())
    }

    fn name(&self) -> &str {
        "local"
    }
}
