//! Remote TTS client (OpenAI / ElevenLabs) with local playback

use async_trait::async_trait;

use super::{SynthOptions, Synthesizer};
use crate::audio::AudioPlayback;
use crate::{Error, Result};

/// TTS provider backend
#[derive(Clone, Copy, Debug)]
enum TtsProvider {
    OpenAI,
    ElevenLabs,
}

/// Synthesizes speech from text and plays it through the speakers
pub struct SpeechSynthesizer {
    client: reqwest::Client,
    api_key: String,
    voice: String,
    model: String,
    options: SynthOptions,
    provider: TtsProvider,
    playback: AudioPlayback,
}

impl SpeechSynthesizer {
    /// Create a new synthesizer using `OpenAI` TTS
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing or no output device exists
    pub fn new_openai(
        api_key: String,
        voice: String,
        model: String,
        options: SynthOptions,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice,
            model,
            options,
            provider: TtsProvider::OpenAI,
            playback: AudioPlayback::new()?,
        })
    }

    /// Create a new synthesizer using ElevenLabs
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing or no output device exists
    pub fn new_elevenlabs(
        api_key: String,
        voice_id: String,
        model: String,
        options: SynthOptions,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice: voice_id,
            model,
            options,
            provider: TtsProvider::ElevenLabs,
            playback: AudioPlayback::new()?,
        })
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        match self.provider {
            TtsProvider::OpenAI => self.synthesize_openai(text).await,
            TtsProvider::ElevenLabs => self.synthesize_elevenlabs(text).await,
        }
    }

    /// Synthesize using OpenAI TTS
    async fn synthesize_openai(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.options.speed(),
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }

    /// Synthesize using ElevenLabs TTS
    async fn synthesize_elevenlabs(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!("https://api.elevenlabs.io/v1/text-to-speech/{}", self.voice);

        let request = ElevenLabsRequest {
            text,
            model_id: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}

#[async_trait]
impl Synthesizer for SpeechSynthesizer {
    async fn say(&mut self, text: &str) -> Result<()> {
        tracing::debug!(chars = text.len(), "synthesizing speech");
        let mp3 = self.synthesize(text).await?;
        self.playback.play_mp3(&mp3, self.options.volume)
    }
}
