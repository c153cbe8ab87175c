//! `FileSystemAccess` over `tokio::fs`

use async_trait::async_trait;
use bridge_traits::{error::Result, storage::FileSystemAccess};
use bytes::Bytes;
use std::path::Path;
use tokio::fs;
use tracing::trace;

/// Plain files on the local disk; I/O errors surface as `BridgeError::Io`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::try_exists(path).await?)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(path).await?)
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path).await?;
        trace!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    /// Creates missing parent directories first.
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).await?,
            _ => {}
        }
        fs::write(path, &data).await?;
        trace!(path = ?path, size = data.len(), "Wrote file");
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        Ok(fs::rename(from, to).await?)
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        Ok(fs::remove_file(path).await?)
    }
}
