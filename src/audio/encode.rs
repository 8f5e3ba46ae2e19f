//! Payload encoding: PCM buffers to recognizer-compatible byte payloads

use super::capture::{AudioBuffer, CHANNELS, SAMPLE_RATE};
use crate::Result;

/// Bytes per sample in a recognition payload (16-bit PCM)
pub const SAMPLE_WIDTH_BYTES: u16 = 2;

/// An encoded recording ready for backend submission
///
/// Raw little-endian sample bytes plus the fixed metadata the backend needs
/// to interpret them. Owned by the turn that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionPayload {
    /// Little-endian 16-bit PCM bytes
    pub bytes: Vec<u8>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: u16,
    /// Bytes per sample
    pub sample_width_bytes: u16,
}

/// Encode a captured buffer into its backend submission form
///
/// Pure and deterministic: the same buffer always yields a byte-identical
/// payload with metadata (16000, 1, 2).
#[must_use]
pub fn encode(buffer: &AudioBuffer) -> RecognitionPayload {
    let mut bytes = Vec::with_capacity(buffer.len() * usize::from(SAMPLE_WIDTH_BYTES));
    for sample in buffer.samples() {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    RecognitionPayload {
        bytes,
        sample_rate: SAMPLE_RATE,
        channels: CHANNELS,
        sample_width_bytes: SAMPLE_WIDTH_BYTES,
    }
}

/// Frame a payload as a WAV container for HTTP upload
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn payload_to_wav(payload: &RecognitionPayload) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: payload.channels,
        sample_rate: payload.sample_rate,
        bits_per_sample: payload.sample_width_bytes * 8,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| crate::Error::Audio(e.to_string()))?;

        for chunk in payload.bytes.chunks_exact(usize::from(payload.sample_width_bytes)) {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            writer
                .write_sample(sample)
                .map_err(|e| crate::Error::Audio(e.to_string()))?;
        }

        writer
            .finalize()
            .map_err(|e| crate::Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
