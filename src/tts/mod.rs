//! Text-to-speech: synthesizer seam and remote TTS client

mod client;

pub use client::SpeechSynthesizer;

use async_trait::async_trait;

use crate::Result;

/// Baseline speaking rate the speed multiplier is computed against
const BASELINE_RATE_WPM: u32 = 150;

/// Synthesizer tuning options
#[derive(Debug, Clone, Copy)]
pub struct SynthOptions {
    /// Speaking rate in words per minute
    pub rate_wpm: u32,
    /// Playback volume in [0.0, 1.0]
    pub volume: f32,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            rate_wpm: BASELINE_RATE_WPM,
            volume: 1.0,
        }
    }
}

impl SynthOptions {
    /// Speed multiplier relative to the 150 wpm baseline, clamped to the
    /// range TTS APIs accept
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn speed(&self) -> f32 {
        (self.rate_wpm as f32 / BASELINE_RATE_WPM as f32).clamp(0.25, 4.0)
    }
}

/// Vocalizes an utterance, blocking until playback completes
#[async_trait]
pub trait Synthesizer {
    /// Synthesize `text` and play it
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    async fn say(&mut self, text: &str) -> Result<()>;
}
