//! Blob storage for generated hero images
//!
//! Writes image bytes under the storage root, keyed by preview id, and
//! resolves the publicly readable URL. The storage root is served back over
//! HTTP at `/storage` by the router.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Blob storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Local blob storage rooted at a configured directory
#[derive(Debug, Clone)]
pub struct BlobStorage {
    root: PathBuf,
    public_base_url: String,
}

impl BlobStorage {
    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self { root, public_base_url }
    }

    /// Persist hero image bytes for a preview and return the public URL
    ///
    /// Path layout: `previews/{preview_id}/hero.png`, overwritten on
    /// regeneration of the same preview id.
    pub async fn store_hero_image(
        &self,
        preview_id: Uuid,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let relative = format!("previews/{}/hero.png", preview_id);
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), "Stored hero image");

        Ok(format!("{}/storage/{}", self.public_base_url, relative))
    }
}
