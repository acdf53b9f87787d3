pub mod capture;

pub use capture::{
    AudioCaptureFactory, AudioCaptureStats, AudioCaptureWriter, MediaFormat, SampleFormat,
    WavCapture, WavCaptureFactory,
};
