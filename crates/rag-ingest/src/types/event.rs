//! Object-storage events that trigger ingestion

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Notification that an object landed in the store.
///
/// The key encodes `{tenant}/{documentId}/{filename}` by convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectCreatedEvent {
    /// Bucket holding the object
    pub bucket: String,
    /// Object key within the bucket
    pub key: String,
}

impl ObjectCreatedEvent {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Tenant owning the document: the first path segment of the key
    pub fn tenant_id(&self) -> Result<&str> {
        self.segment(0)
    }

    /// Document identity: the second path segment of the key
    pub fn document_id(&self) -> Result<&str> {
        self.segment(1)
    }

    /// Lowercased file extension of the final path segment, if any
    pub fn extension(&self) -> Option<String> {
        let filename = self.key.rsplit('/').next()?;
        let (stem, ext) = filename.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Source location handed to the extraction service
    pub fn location(&self) -> StorageLocation {
        StorageLocation {
            bucket: self.bucket.clone(),
            key: self.key.clone(),
        }
    }

    fn segment(&self, index: usize) -> Result<&str> {
        self.key
            .split('/')
            .nth(index)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "Object key '{}' does not follow tenant/document/filename convention",
                    self.key
                ))
            })
    }
}

/// Location of source bytes in the object store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageLocation {
    pub bucket: String,
    pub key: String,
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tenant_and_document_from_key() {
        let event = ObjectCreatedEvent::new("uploads", "acme/doc-42/report.pdf");
        assert_eq!(event.tenant_id().unwrap(), "acme");
        assert_eq!(event.document_id().unwrap(), "doc-42");
        assert_eq!(event.extension().as_deref(), Some("pdf"));
    }

    #[test]
    fn extension_is_lowercased() {
        let event = ObjectCreatedEvent::new("uploads", "acme/doc-1/Scan.JPEG");
        assert_eq!(event.extension().as_deref(), Some("jpeg"));
    }

    #[test]
    fn missing_segments_are_rejected() {
        let event = ObjectCreatedEvent::new("uploads", "orphan.txt");
        assert!(event.tenant_id().is_ok());
        assert!(event.document_id().is_err());
    }

    #[test]
    fn files_without_extension_yield_none() {
        let event = ObjectCreatedEvent::new("uploads", "acme/doc-1/README");
        assert_eq!(event.extension(), None);
        let dotfile = ObjectCreatedEvent::new("uploads", "acme/doc-1/.gitignore");
        assert_eq!(dotfile.extension(), None);
    }
}
