//! Audio pipeline: capture, payload encoding, and playback
//!
//! Capture and playback talk to real hardware through cpal; encoding is pure.

mod capture;
mod encode;
mod playback;

pub use capture::{AudioBuffer, AudioCapture, CaptureSource, CALIBRATION, CHANNELS, SAMPLE_RATE};
pub use encode::{encode, payload_to_wav, RecognitionPayload, SAMPLE_WIDTH_BYTES};
pub use playback::AudioPlayback;
