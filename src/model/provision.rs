//! Model provisioning: download-once, name-addressed artifact cache.
//!
//! DESIGN
//! ======
//! Each size class maps to one fixed (filename, URL) pair. `ensure_model`
//! creates the cache directory, and downloads only when the target file is
//! missing. There is no checksum and no resume. Downloads land in a
//! `.part` sibling and are renamed into place on success, so an interrupted
//! transfer never looks like a complete model.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::artifact::{LocalModel, ModelArtifact, SizeClass};
use super::types::ProvisionError;

/// Suffix for in-progress downloads.
const PARTIAL_SUFFIX: &str = ".part";

// =============================================================================
// FETCHER
// =============================================================================

/// Transfers one remote artifact to a local path. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Download `url` into `dest`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionError`] if the request or the write fails.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, ProvisionError>;
}

/// Plain HTTPS GET, streamed to disk chunk by chunk.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ProvisionError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ProvisionError::Download(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, ProvisionError> {
        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ProvisionError::Download(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(ProvisionError::HttpStatus { status, url: url.to_string() });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ProvisionError::Download(e.to_string()))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

// =============================================================================
// PROVISIONER
// =============================================================================

/// Ensures model artifacts exist under one cache directory.
pub struct ModelProvisioner {
    models_dir: PathBuf,
    fetcher: Arc<dyn ArtifactFetcher>,
}

impl ModelProvisioner {
    #[must_use]
    pub fn new(models_dir: PathBuf, fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        Self { models_dir, fetcher }
    }

    /// Where the artifact for `size` lives, whether or not it exists yet.
    #[must_use]
    pub fn target_path(&self, size: SizeClass) -> PathBuf {
        self.models_dir.join(size.source().filename)
    }

    /// Report cache status without touching the network.
    pub async fn inspect(&self, size: SizeClass) -> ModelArtifact {
        let local_path = self.target_path(size);
        let exists = tokio::fs::try_exists(&local_path).await.unwrap_or(false);
        ModelArtifact { size_class: size, local_path, exists }
    }

    /// Make sure the artifact for `size` is on disk, downloading it if absent.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionError`] if the directory cannot be created, the
    /// download fails, or the final path cannot be expressed as a URI.
    pub async fn ensure_model(&self, size: SizeClass) -> Result<LocalModel, ProvisionError> {
        tokio::fs::create_dir_all(&self.models_dir)
            .await
            .map_err(|e| ProvisionError::Directory(format!("{}: {e}", self.models_dir.display())))?;

        let source = size.source();
        let target = self.target_path(size);

        if tokio::fs::try_exists(&target).await? {
            info!(size = %size, path = %target.display(), "model cache hit");
        } else {
            let partial = partial_path(&target);
            info!(size = %size, url = source.url, "model cache miss, downloading");
            match self.fetcher.fetch(source.url, &partial).await {
                Ok(bytes) => {
                    tokio::fs::rename(&partial, &target).await?;
                    info!(size = %size, bytes, path = %target.display(), "model download complete");
                }
                Err(e) => {
                    if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                        if cleanup.kind() != std::io::ErrorKind::NotFound {
                            warn!(error = %cleanup, path = %partial.display(), "partial download cleanup failed");
                        }
                    }
                    return Err(e);
                }
            }
        }

        let path = tokio::fs::canonicalize(&target).await?;
        let uri = reqwest::Url::from_file_path(&path)
            .map_err(|()| ProvisionError::InvalidPath(path.display().to_string()))?
            .to_string();
        Ok(LocalModel { size_class: size, path, uri })
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(PARTIAL_SUFFIX);
    target.with_file_name(name)
}

#[cfg(test)]
#[path = "provision_test.rs"]
mod tests;
