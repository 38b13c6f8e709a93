//! Artifact persistence.
//!
//! The pipeline only needs "store this record under this key and tell me
//! where it went"; [`ArtifactStore`] is that seam. [`JsonFileStore`] is the
//! default: one pretty-printed JSON file per artifact, laid out the way the
//! document server scans its storage directory.

use crate::error::IngestError;
use crate::output::{Artifact, ArtifactDescriptor};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Folder, relative to the store root, that uploaded documents land in.
pub const DEFAULT_DOCUMENTS_FOLDER: &str = "custom-documents";

/// Durable storage for converted artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `artifact` under `key`; keys are unique per artifact.
    async fn persist(&self, artifact: &Artifact, key: &str)
        -> Result<ArtifactDescriptor, IngestError>;
}

/// Writes each artifact to `<root>/<folder>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
    folder: String,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            folder: DEFAULT_DOCUMENTS_FOLDER.to_string(),
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path the artifact for `key` is written to.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(&self.folder).join(format!("{key}.json"))
    }
}

#[async_trait]
impl ArtifactStore for JsonFileStore {
    async fn persist(
        &self,
        artifact: &Artifact,
        key: &str,
    ) -> Result<ArtifactDescriptor, IngestError> {
        let path = self.path_for(key);
        let json = serde_json::to_vec_pretty(artifact).map_err(|e| IngestError::Serialization {
            key: key.to_string(),
            source: e,
        })?;

        let target = path.clone();
        let key_owned = key.to_string();
        tokio::task::spawn_blocking(move || write_atomic(&target, &json))
            .await
            .map_err(|e| IngestError::Internal(format!("Store task panicked: {e}")))?
            .map_err(|e| IngestError::PersistFailed {
                key: key_owned,
                path: path.clone(),
                source: e,
            })?;

        info!("Persisted artifact {} → {}", artifact.id, path.display());
        Ok(ArtifactDescriptor {
            location: format!("{}/{}.json", self.folder, key),
            artifact: artifact.clone(),
        })
    }
}

/// Atomic write: temp file in the target directory, then rename over the
/// target, so readers never observe a half-written artifact.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::other("artifact path has no parent directory"))?;
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{NO_AUTHOR, NO_DESCRIPTION, SOURCE_KIND};

    fn artifact() -> Artifact {
        Artifact {
            id: "0000-1111".into(),
            source_url: "file:///hot/report.pdf".into(),
            title: "report.pdf".into(),
            author: NO_AUTHOR.into(),
            description: NO_DESCRIPTION.into(),
            source_kind: SOURCE_KIND.into(),
            chunk_source: String::new(),
            created_at: None,
            word_count: 3,
            content: "one two three".into(),
            token_estimate: 3,
        }
    }

    #[tokio::test]
    async fn persist_writes_json_under_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let desc = store.persist(&artifact(), "report.pdf-0000-1111").await.unwrap();
        assert_eq!(desc.location, "custom-documents/report.pdf-0000-1111.json");

        let written = std::fs::read_to_string(store.path_for("report.pdf-0000-1111")).unwrap();
        let back: Artifact = serde_json::from_str(&written).unwrap();
        assert_eq!(back, artifact());
    }

    #[tokio::test]
    async fn persist_respects_custom_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).with_folder("uploads");
        let desc = store.persist(&artifact(), "k").await.unwrap();
        assert_eq!(desc.location, "uploads/k.json");
        assert!(dir.path().join("uploads/k.json").exists());
    }

    #[tokio::test]
    async fn persist_fails_when_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let store = JsonFileStore::new(&blocker);
        let err = store.persist(&artifact(), "k").await.unwrap_err();
        assert!(err.is_persistence_failure(), "got: {err}");
    }
}
