//! Artifact persistence used by the script-only workflow.

use std::path::Path;

use async_trait::async_trait;

use crate::error::BoxError;

/// Writes artifacts under the storage root.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write `bytes` to `path`, replacing any existing artifact.
    async fn write(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BoxError>;
}

/// Store backed by the local filesystem. Parent directories are created on
/// demand.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalArtifactStore;

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn write(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BoxError> {
        let path = Path::new(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &bytes).await?;
        tracing::debug!(path = %path.display(), content_type, size = bytes.len(), "Artifact written");
        Ok(())
    }
}
