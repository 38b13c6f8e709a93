//! Source-file housekeeping: creation time lookup and transient-file removal.

use crate::error::IngestError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::debug;

/// Filesystem operations the pipeline performs on its input file.
#[async_trait]
pub trait SourceFiles: Send + Sync {
    /// Remove the transient input. A file that is already gone is not an error.
    async fn delete_file(&self, path: &Path) -> Result<(), IngestError>;

    /// When the file was created, if the platform can tell.
    async fn created_at(&self, path: &Path) -> Option<DateTime<Utc>>;
}

/// [`SourceFiles`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

#[async_trait]
impl SourceFiles for LocalFiles {
    async fn delete_file(&self, path: &Path) -> Result<(), IngestError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IngestError::CleanupFailed {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    async fn created_at(&self, path: &Path) -> Option<DateTime<Utc>> {
        let meta = tokio::fs::metadata(path).await.ok()?;
        // Birth time is missing on some Linux filesystems; mtime is the
        // closest stable substitute.
        meta.created()
            .or_else(|_| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        LocalFiles.delete_file(&path).await.unwrap();
        assert!(!path.exists());
        LocalFiles.delete_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn created_at_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let ts = LocalFiles.created_at(&path).await.expect("timestamp");
        assert!(ts <= Utc::now());
        assert!(LocalFiles.created_at(&dir.path().join("missing")).await.is_none());
    }
}
