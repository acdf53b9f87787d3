use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncRead;
use tracing::debug;

use crate::error::{RecorderError, Result};

/// A remote blob destination (bucket, container, archive share)
///
/// Implementations receive the artifact as a stream together with its size
/// and return the URI the object can later be fetched from. Returning `Ok`
/// means the destination confirmed receipt.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Destination name used in logs
    fn name(&self) -> &str;

    /// Store `size` bytes read from `body` under `key`
    async fn put(
        &self,
        key: &str,
        body: &mut (dyn AsyncRead + Send + Unpin),
        size: u64,
    ) -> Result<String>;
}

/// Destination backed by a directory tree
///
/// Useful for archive mounts and local development. Objects are written to a
/// `.part` file and renamed once complete, so a reader never sees a
/// half-written artifact.
#[derive(Debug, Clone)]
pub struct LocalDirectoryBackend {
    name: String,
    root: PathBuf,
}

impl LocalDirectoryBackend {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));

        if key.is_empty() || escapes {
            return Err(RecorderError::Storage {
                destination: self.name.clone(),
                key: key.to_string(),
                message: "invalid object key".to_string(),
            });
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageBackend for LocalDirectoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(
        &self,
        key: &str,
        body: &mut (dyn AsyncRead + Send + Unpin),
        size: u64,
    ) -> Result<String> {
        let target = self.object_path(key)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut partial = target.clone().into_os_string();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        let mut file = File::create(&partial).await?;
        let copied = tokio::io::copy(body, &mut file).await?;
        file.sync_all().await?;
        drop(file);

        if copied != size {
            let _ = fs::remove_file(&partial).await;
            return Err(RecorderError::Storage {
                destination: self.name.clone(),
                key: key.to_string(),
                message: format!("short write: expected {} bytes, copied {}", size, copied),
            });
        }

        fs::rename(&partial, &target).await?;

        debug!("Stored {} bytes at {}", copied, target.display());

        Ok(format!("file://{}", target.display()))
    }
}
