//! Fixed-duration audio capture from the microphone

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Channel count for audio capture (mono)
pub const CHANNELS: u16 = 1;

/// Length of the discarded warm-up recording before each capture.
///
/// Lets the device and stream settle; the samples are thrown away. This is
/// not a noise profile and no adaptive filtering happens.
pub const CALIBRATION: Duration = Duration::from_millis(500);

/// A fixed-length recording: 16kHz mono 16-bit signed PCM.
///
/// The sample count is always exactly `sample_rate * duration * channels`;
/// construction truncates overrun and zero-pads underrun so callers can rely
/// on the length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    duration: Duration,
}

impl AudioBuffer {
    /// Build a buffer from raw samples, normalizing to the exact expected length
    #[must_use]
    pub fn from_samples(mut samples: Vec<i16>, duration: Duration) -> Self {
        samples.resize(Self::expected_len(duration), 0);
        Self { samples, duration }
    }

    /// Exact sample count for a recording of `duration`
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn expected_len(duration: Duration) -> usize {
        (f64::from(SAMPLE_RATE) * duration.as_secs_f64()).round() as usize * usize::from(CHANNELS)
    }

    /// The PCM samples
    #[must_use]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Number of samples in the buffer
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recording length
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    /// Channel count
    #[must_use]
    pub const fn channels(&self) -> u16 {
        CHANNELS
    }

    /// Bits per sample
    #[must_use]
    pub const fn sample_width_bits(&self) -> u16 {
        16
    }
}

/// Source of fixed-duration recordings
///
/// The session loop depends on this seam so turn handling can be tested
/// without audio hardware.
pub trait CaptureSource {
    /// Record for exactly `duration`, blocking until the buffer is full
    ///
    /// # Errors
    ///
    /// Returns [`Error::Device`] if no input device exists or it cannot be
    /// opened; [`Error::Audio`] if `duration` is not positive.
    fn record(&mut self, duration: Duration) -> Result<AudioBuffer>;
}

/// Captures audio from the default input device
///
/// The device is opened once per [`CaptureSource::record`] call and released
/// when the call returns, so nothing is held between turns.
pub struct AudioCapture {
    config: StreamConfig,
    buffer: Arc<Mutex<Vec<f32>>>,
}

impl AudioCapture {
    /// Create a new audio capture instance
    ///
    /// Resolves a 16kHz mono input configuration up front so a missing
    /// device is fatal at startup rather than on the first turn.
    ///
    /// # Errors
    ///
    /// Returns error if no input device or no suitable configuration exists
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Device("no input device available".to_string()))?;

        let supported_config = device
            .supported_input_configs()
            .map_err(|e| Error::Device(e.to_string()))?
            .find(|c| {
                c.channels() == CHANNELS
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Device("no suitable input config found".to_string()))?;

        let config = supported_config
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels = config.channels,
            "audio capture initialized"
        );

        Ok(Self {
            config,
            buffer: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Open an input stream that appends into the shared buffer
    fn open_stream(&self) -> Result<Stream> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Device("no input device".to_string()))?;

        let buffer = Arc::clone(&self.buffer);
        let stream = device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Device(e.to_string()))?;

        stream.play().map_err(|e| Error::Device(e.to_string()))?;
        Ok(stream)
    }

    fn clear_buffer(&self) {
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }

    fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }
}

impl CaptureSource for AudioCapture {
    fn record(&mut self, duration: Duration) -> Result<AudioBuffer> {
        if duration.is_zero() {
            return Err(Error::Audio("capture duration must be positive".to_string()));
        }

        let stream = self.open_stream()?;

        // Warm-up phase: let the device settle, then throw the samples away
        thread::sleep(CALIBRATION);
        self.clear_buffer();

        tracing::debug!(seconds = duration.as_secs_f64(), "recording");
        thread::sleep(duration);

        // Releases the device before the buffer is read out
        drop(stream);

        let raw = self.take_buffer();
        #[allow(clippy::cast_possible_truncation)]
        let samples: Vec<i16> = raw
            .iter()
            .map(|&s| (s * 32767.0).clamp(-32768.0, 32767.0) as i16)
            .collect();

        tracing::debug!(samples = samples.len(), "capture complete");
        Ok(AudioBuffer::from_samples(samples, duration))
    }
}
