use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{RecorderError, Result};

/// Sample encoding negotiated for the media stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 16-bit signed PCM
    Int16,
    /// 32-bit IEEE float
    Float32,
}

/// Concrete media parameters, known once the session negotiates them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFormat {
    pub sample_format: SampleFormat,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
}

/// Samples written and derived duration of a closed capture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioCaptureStats {
    pub samples: u64,
    pub duration_secs: f64,
}

impl AudioCaptureStats {
    pub fn new(samples: u64, format: &MediaFormat) -> Self {
        let per_second = format.sample_rate as f64 * format.channels.max(1) as f64;
        let duration_secs = if per_second > 0.0 {
            samples as f64 / per_second
        } else {
            0.0
        };

        Self {
            samples,
            duration_secs,
        }
    }
}

/// Sink for raw audio samples of one recording
#[async_trait]
pub trait AudioCaptureWriter: Send {
    /// Append interleaved samples
    fn write(&mut self, samples: &[i16]) -> Result<()>;

    /// Finish the file and return the number of samples written
    async fn close(&mut self) -> Result<u64>;

    /// Path of the produced waveform file
    fn path(&self) -> &Path;
}

/// Creates capture writers once a media format is known
pub trait AudioCaptureFactory: Send + Sync {
    fn start(&self, path: &Path, format: MediaFormat) -> Result<Box<dyn AudioCaptureWriter>>;
}

/// WAV capture backed by `hound`
pub struct WavCapture {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    path: PathBuf,
    format: MediaFormat,
    samples: u64,
}

impl WavCapture {
    pub fn create(path: impl Into<PathBuf>, format: MediaFormat) -> Result<Self> {
        let path = path.into();

        if format.channels == 0 || format.sample_rate == 0 {
            return Err(RecorderError::InvalidMediaFormat(format!(
                "{} channels at {}Hz",
                format.channels, format.sample_rate
            )));
        }

        let spec = match format.sample_format {
            SampleFormat::Int16 => hound::WavSpec {
                channels: format.channels,
                sample_rate: format.sample_rate,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            },
            SampleFormat::Float32 => hound::WavSpec {
                channels: format.channels,
                sample_rate: format.sample_rate,
                bits_per_sample: 32,
                sample_format: hound::SampleFormat::Float,
            },
        };

        let writer = hound::WavWriter::create(&path, spec)?;

        info!(
            "Audio capture started: {} ({}Hz, {} channels, {:?})",
            path.display(),
            format.sample_rate,
            format.channels,
            format.sample_format
        );

        Ok(Self {
            writer: Some(writer),
            path,
            format,
            samples: 0,
        })
    }

    pub fn format(&self) -> MediaFormat {
        self.format
    }
}

#[async_trait]
impl AudioCaptureWriter for WavCapture {
    fn write(&mut self, samples: &[i16]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or(RecorderError::WriterClosed("audio capture writer"))?;

        match self.format.sample_format {
            SampleFormat::Int16 => {
                for &sample in samples {
                    writer.write_sample(sample)?;
                }
            }
            SampleFormat::Float32 => {
                for &sample in samples {
                    writer.write_sample(sample as f32 / 32768.0)?;
                }
            }
        }

        self.samples += samples.len() as u64;

        Ok(())
    }

    async fn close(&mut self) -> Result<u64> {
        let writer = self
            .writer
            .take()
            .ok_or(RecorderError::WriterClosed("audio capture writer"))?;

        tokio::task::spawn_blocking(move || writer.finalize())
            .await
            .map_err(|e| RecorderError::Io(std::io::Error::other(e)))??;

        Ok(self.samples)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WavCapture {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV writer on drop: {}", e);
            }
        }
    }
}

/// Factory producing [`WavCapture`] writers
#[derive(Debug, Clone, Copy, Default)]
pub struct WavCaptureFactory;

impl AudioCaptureFactory for WavCaptureFactory {
    fn start(&self, path: &Path, format: MediaFormat) -> Result<Box<dyn AudioCaptureWriter>> {
        Ok(Box::new(WavCapture::create(path, format)?))
    }
}
