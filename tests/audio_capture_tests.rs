// Integration tests for the WAV audio capture writer

use anyhow::Result;
use hound::WavReader;
use session_recorder::audio::{
    AudioCaptureFactory, AudioCaptureStats, AudioCaptureWriter, MediaFormat, SampleFormat,
    WavCapture, WavCaptureFactory,
};
use session_recorder::RecorderError;
use tempfile::TempDir;

fn pcm16(sample_rate: u32, channels: u16) -> MediaFormat {
    MediaFormat {
        sample_format: SampleFormat::Int16,
        sample_rate,
        channels,
    }
}

#[tokio::test]
async fn test_capture_counts_samples_and_duration() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("capture.wav");
    let format = pcm16(8000, 1);

    let mut writer = WavCaptureFactory.start(&path, format)?;

    // 20 frames of 800 samples = 16000 samples
    for i in 0..20 {
        writer.write(&vec![(i * 100) as i16; 800])?;
    }
    let samples = writer.close().await?;

    assert_eq!(samples, 16000);
    let stats = AudioCaptureStats::new(samples, &format);
    assert_eq!(stats.duration_secs, 2.0);

    let reader = WavReader::open(&path)?;
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len(), 16000);

    Ok(())
}

#[tokio::test]
async fn test_stereo_duration_counts_frames() -> Result<()> {
    let stats = AudioCaptureStats::new(32000, &pcm16(8000, 2));
    assert_eq!(stats.duration_secs, 2.0);

    let empty = AudioCaptureStats::new(0, &pcm16(16000, 1));
    assert_eq!(empty.duration_secs, 0.0);

    Ok(())
}

#[tokio::test]
async fn test_float_capture_writes_float_wav() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("float.wav");
    let format = MediaFormat {
        sample_format: SampleFormat::Float32,
        sample_rate: 16000,
        channels: 1,
    };

    let mut writer = WavCapture::create(&path, format)?;
    writer.write(&[0, 16384, -32768])?;
    writer.close().await?;

    let mut reader = WavReader::open(&path)?;
    assert_eq!(reader.spec().sample_format, hound::SampleFormat::Float);
    let samples: Vec<f32> = reader.samples::<f32>().collect::<Result<_, _>>()?;
    assert_eq!(samples, vec![0.0, 0.5, -1.0]);

    Ok(())
}

#[tokio::test]
async fn test_capture_rejects_use_after_close() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("closed.wav");

    let mut writer = WavCapture::create(&path, pcm16(8000, 1))?;
    writer.write(&[1, 2, 3])?;
    assert_eq!(writer.close().await?, 3);

    assert!(matches!(
        writer.write(&[4]),
        Err(RecorderError::WriterClosed(_))
    ));
    assert!(matches!(
        writer.close().await,
        Err(RecorderError::WriterClosed(_))
    ));
    assert_eq!(writer.path(), path.as_path());

    Ok(())
}

#[test]
fn test_capture_rejects_degenerate_format() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let factory = WavCaptureFactory;

    for (rate, channels) in [(8000, 0), (0, 1), (0, 0)] {
        let path = temp_dir.path().join(format!("bad-{}-{}.wav", rate, channels));

        let result = factory.start(&path, pcm16(rate, channels));
        assert!(
            matches!(result, Err(RecorderError::InvalidMediaFormat(_))),
            "{}Hz x {} must be refused",
            rate,
            channels
        );
        assert!(!path.exists(), "no file created for a refused format");
    }

    Ok(())
}
