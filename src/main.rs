use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use session_recorder::{
    Config, MediaFormat, Recorder, RecordingRegistry, SampleFormat, Severity, StreamSession,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "session-recorder", about = "Record streaming sessions to sidecar and audio artifacts")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/session-recorder")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drive a synthetic session through the recorder and archive it
    Simulate {
        /// Seconds of audio to generate
        #[arg(long, default_value_t = 2)]
        seconds: u32,

        /// Skip media negotiation (no audio artifact)
        #[arg(long)]
        no_media: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config).context("Failed to load configuration")?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Recordings directory: {}", cfg.recording.recordings_path);

    let registry = Arc::new(RecordingRegistry::new());
    let mut recorder = Recorder::new(cfg.session_config()?, Arc::clone(&registry));
    match cfg.uploader() {
        Some(uploader) => {
            info!("Storage destinations: {}", uploader.destination_names().join(", "));
            recorder = recorder.with_uploader(uploader);
        }
        None => warn!("No storage configured; recordings stay on local disk"),
    }

    match cli.command {
        Command::Simulate { seconds, no_media } => simulate(&recorder, seconds, no_media).await,
    }
}

async fn simulate(recorder: &Recorder, seconds: u32, no_media: bool) -> Result<()> {
    let stream = StreamSession::new(format!("simulated-{}", uuid::Uuid::new_v4()));
    let handle = recorder.record(&stream).await?;

    info!(
        "Recording {} -> {}",
        handle.recording_id(),
        handle.event_log_path().display()
    );

    stream.client_message(json!({ "type": "start", "encoding": "pcm16" }));
    stream.server_message(json!({ "type": "ready" }));
    stream.log(Severity::Debug, "Negotiating media", json!({ "codec": "pcm" }));

    if !no_media {
        let format = MediaFormat {
            sample_format: SampleFormat::Int16,
            sample_rate: 8000,
            channels: 1,
        };
        stream.media_opened(format);

        // 440 Hz tone, 100 ms frames
        let frame_len = (format.sample_rate / 10) as usize;
        for frame in 0..seconds * 10 {
            let offset = frame as usize * frame_len;
            let samples = (0..frame_len)
                .map(|i| {
                    let t = (offset + i) as f32 / format.sample_rate as f32;
                    ((t * 440.0 * std::f32::consts::TAU).sin() * 8000.0) as i16
                })
                .collect();
            stream.audio(samples);

            if frame % 10 == 0 {
                stream.statistics(json!({ "frames": frame, "jitter_ms": 0.0 }));
            }
        }

        stream.media_closed();
    }

    stream.server_message(json!({ "type": "bye" }));
    stream.end();

    let report = handle.wait().await?;
    info!("Recording finished: {}", serde_json::to_string_pretty(&report)?);
    info!("Active recordings: {}", recorder.registry().len());

    Ok(())
}
