use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::RecorderError;
use crate::session::SessionConfig;
use crate::sidecar::{LogLevels, Severity};
use crate::storage::{ArtifactUploader, LocalDirectoryBackend};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub recording: RecordingConfig,
    /// Absent means artifacts stay on local disk
    #[serde(default)]
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordingConfig {
    pub recordings_path: String,
    #[serde(default = "default_persist_level")]
    pub persist_level: Severity,
    #[serde(default = "default_mirror_level")]
    pub mirror_level: Severity,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub primary: DestinationConfig,
    #[serde(default)]
    pub secondary: Vec<DestinationConfig>,
}

#[derive(Debug, Deserialize)]
pub struct DestinationConfig {
    /// Bucket/container name, used in logs
    pub name: String,
    /// Directory the destination is mounted at
    pub root: String,
}

fn default_persist_level() -> Severity {
    LogLevels::default().persist
}

fn default_mirror_level() -> Severity {
    LogLevels::default().mirror
}

impl Config {
    /// Load from a file (any format the `config` crate detects), with
    /// `RECORDER__SECTION__KEY` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("RECORDER").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn session_config(&self) -> Result<SessionConfig> {
        Ok(SessionConfig {
            output_dir: PathBuf::from(&self.recording.recordings_path),
            log_levels: self.recording.log_levels()?,
            request_metadata: None,
        })
    }

    pub fn uploader(&self) -> Option<ArtifactUploader> {
        self.storage.as_ref().map(StorageConfig::build_uploader)
    }
}

impl RecordingConfig {
    /// The sidecar must keep at least as much detail as the live log
    pub fn log_levels(&self) -> std::result::Result<LogLevels, RecorderError> {
        if self.persist_level > self.mirror_level {
            return Err(RecorderError::Config(format!(
                "persist_level ({}) must not be above mirror_level ({})",
                self.persist_level.as_str(),
                self.mirror_level.as_str()
            )));
        }

        Ok(LogLevels {
            persist: self.persist_level,
            mirror: self.mirror_level,
        })
    }
}

impl StorageConfig {
    pub fn build_uploader(&self) -> ArtifactUploader {
        let primary = LocalDirectoryBackend::new(&self.primary.name, &self.primary.root);
        self.secondary.iter().fold(
            ArtifactUploader::new(Arc::new(primary)),
            |uploader, destination| {
                uploader.with_secondary(Arc::new(LocalDirectoryBackend::new(
                    &destination.name,
                    &destination.root,
                )))
            },
        )
    }
}
