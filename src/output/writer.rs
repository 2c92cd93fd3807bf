//! Artifact writer
//!
//! Persists converted pages and downloaded PDFs under the working directory,
//! creating parent directories as needed. Every target path is checked to
//! lie inside the working directory before anything touches the disk.

use crate::url::is_within;
use crate::{MirrorError, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Writes mirror artifacts to disk
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    working_dir: PathBuf,
    client: Client,
}

impl ArtifactWriter {
    /// Creates a writer rooted at `working_dir`, downloading with `client`
    pub fn new(working_dir: impl Into<PathBuf>, client: Client) -> Self {
        Self {
            working_dir: working_dir.into(),
            client,
        }
    }

    /// The root every artifact must live under
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Writes `content` to `path`, replacing any existing file
    ///
    /// Parent directories are created recursively; pre-existing ones are fine.
    pub async fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        self.prepare(path).await?;
        tokio::fs::write(path, content).await?;
        tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    /// Downloads `url` and streams the body to `path`
    ///
    /// A non-2xx status fails before anything is written. A failure while
    /// streaming may leave a partial file behind; the caller does not record
    /// it, and the next successful write or reconciliation replaces it.
    ///
    /// # Returns
    ///
    /// The number of bytes written
    pub async fn download(&self, url: &Url, path: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|source| MirrorError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        self.prepare(path).await?;
        let mut file = tokio::fs::File::create(path).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await.map_err(|source| MirrorError::Http {
            url: url.to_string(),
            source,
        })? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!("Downloaded {} ({} bytes) to {}", url, written, path.display());
        Ok(written)
    }

    async fn prepare(&self, path: &Path) -> Result<()> {
        if !is_within(&self.working_dir, path) {
            return Err(MirrorError::OutsideWorkingDir(path.to_path_buf()));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}
