use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::fs::{self, File};
use tracing::{info, warn};

use super::backend::StorageBackend;
use crate::error::{normalize_error, RecorderError, Result};

/// Where an uploaded artifact ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub uri: String,
    pub size: u64,
}

/// Stream one local file to one destination
///
/// The local file is left untouched. Every failure, including a missing
/// source file, is reported as [`RecorderError::Storage`].
pub async fn upload_to(
    backend: &dyn StorageBackend,
    local_path: &Path,
    key: &str,
) -> Result<UploadReceipt> {
    let attempt = async {
        let size = fs::metadata(local_path).await?.len();
        let mut file = File::open(local_path).await?;
        let uri = backend.put(key, &mut file, size).await?;
        Ok::<_, RecorderError>(UploadReceipt { uri, size })
    };

    attempt.await.map_err(|e| match e {
        storage @ RecorderError::Storage { .. } => storage,
        other => RecorderError::Storage {
            destination: backend.name().to_string(),
            key: key.to_string(),
            message: normalize_error(&other),
        },
    })
}

/// Hands finished artifacts to the configured destinations
///
/// Every destination is attempted independently. The primary decides the
/// outcome: only its confirmation removes the local file. Secondary failures
/// are logged, never returned.
#[derive(Clone)]
pub struct ArtifactUploader {
    primary: Arc<dyn StorageBackend>,
    secondary: Vec<Arc<dyn StorageBackend>>,
}

impl ArtifactUploader {
    pub fn new(primary: Arc<dyn StorageBackend>) -> Self {
        Self {
            primary,
            secondary: Vec::new(),
        }
    }

    pub fn with_secondary(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.secondary.push(backend);
        self
    }

    pub fn primary_name(&self) -> &str {
        self.primary.name()
    }

    pub fn destination_names(&self) -> Vec<String> {
        std::iter::once(&self.primary)
            .chain(self.secondary.iter())
            .map(|b| b.name().to_string())
            .collect()
    }

    /// Upload `local_path` under `key` to every destination
    ///
    /// All destinations are attempted together. The local file is deleted
    /// only once the primary confirms; the primary's result is returned.
    pub async fn upload(&self, local_path: &Path, key: &str) -> Result<UploadReceipt> {
        let primary = upload_to(self.primary.as_ref(), local_path, key);
        let secondary = join_all(self.secondary.iter().map(|backend| async move {
            (backend.name(), upload_to(backend.as_ref(), local_path, key).await)
        }));

        let (primary, secondary) = tokio::join!(primary, secondary);

        for (name, result) in secondary {
            match result {
                Ok(copy) => info!("Secondary copy stored at {} ({})", copy.uri, name),
                Err(e) => warn!(
                    "Secondary upload of {} to {} failed: {}",
                    local_path.display(),
                    name,
                    e
                ),
            }
        }

        let receipt = primary?;

        info!(
            "Uploaded {} to {} as {} ({} bytes)",
            local_path.display(),
            self.primary.name(),
            receipt.uri,
            receipt.size
        );

        if let Err(e) = fs::remove_file(local_path).await {
            warn!(
                "Uploaded {} but could not remove local copy: {}",
                local_path.display(),
                e
            );
        }

        Ok(receipt)
    }
}
