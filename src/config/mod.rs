//! Configuration management for the voiceletter assistant

pub mod file;

use std::time::Duration;

use crate::stt::DEFAULT_LANGUAGE;
use crate::tts::SynthOptions;
use crate::{Error, Result};

/// Default per-turn capture window in seconds
const DEFAULT_PHRASE_SECONDS: f64 = 10.0;

/// Runtime configuration, assembled from defaults, the optional config file,
/// and environment variables (in that order of precedence)
#[derive(Debug, Clone)]
pub struct Config {
    /// Language tag for recognition requests
    pub language: String,

    /// Per-turn capture window
    pub phrase_window: Duration,

    /// Speech-to-text configuration
    pub stt: SttConfig,

    /// Text-to-speech configuration
    pub tts: TtsConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Speech-to-text configuration
#[derive(Debug, Clone)]
pub struct SttConfig {
    /// Backend provider ("whisper" or "deepgram")
    pub provider: String,

    /// Model identifier
    pub model: String,
}

/// Text-to-speech configuration
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Provider ("openai" or "elevenlabs")
    pub provider: String,

    /// Voice identifier
    pub voice: String,

    /// Model identifier
    pub model: String,

    /// Synthesizer tuning (rate in wpm, volume)
    pub options: SynthOptions,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper STT and TTS)
    pub openai: Option<String>,

    /// Deepgram API key (optional STT)
    pub deepgram: Option<String>,

    /// ElevenLabs API key (optional TTS)
    pub elevenlabs: Option<String>,
}

impl Config {
    /// Load configuration from defaults, config file, and environment
    ///
    /// # Errors
    ///
    /// Returns error if a resolved value is out of range (volume outside
    /// [0.0, 1.0], non-positive capture window)
    pub fn load() -> Result<Self> {
        let file = file::load_config_file();

        let language = env_var("VOICELETTER_LANGUAGE")
            .or(file.voice.language)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let phrase_seconds = file.voice.phrase_seconds.unwrap_or(DEFAULT_PHRASE_SECONDS);
        if phrase_seconds <= 0.0 || !phrase_seconds.is_finite() {
            return Err(Error::Config(format!(
                "phrase_seconds must be positive, got {phrase_seconds}"
            )));
        }

        let stt_provider = env_var("VOICELETTER_STT_PROVIDER")
            .or(file.stt.provider)
            .unwrap_or_else(|| "whisper".to_string());
        let stt_model = file.stt.model.unwrap_or_else(|| {
            match stt_provider.as_str() {
                "deepgram" => "nova-2".to_string(),
                _ => "whisper-1".to_string(),
            }
        });

        let tts_provider = env_var("VOICELETTER_TTS_PROVIDER")
            .or(file.tts.provider)
            .unwrap_or_else(|| "openai".to_string());
        let tts_voice = file.tts.voice.unwrap_or_else(|| "alloy".to_string());
        let tts_model = file.tts.model.unwrap_or_else(|| {
            match tts_provider.as_str() {
                "elevenlabs" => "eleven_monolingual_v1".to_string(),
                _ => "tts-1".to_string(),
            }
        });

        let defaults = SynthOptions::default();
        let options = SynthOptions {
            rate_wpm: file.tts.rate_wpm.unwrap_or(defaults.rate_wpm),
            volume: file.tts.volume.unwrap_or(defaults.volume),
        };
        if !(0.0..=1.0).contains(&options.volume) {
            return Err(Error::Config(format!(
                "tts volume must be within 0.0..=1.0, got {}",
                options.volume
            )));
        }

        let api_keys = ApiKeys {
            openai: env_var("OPENAI_API_KEY").or(file.api_keys.openai),
            deepgram: env_var("DEEPGRAM_API_KEY").or(file.api_keys.deepgram),
            elevenlabs: env_var("ELEVENLABS_API_KEY").or(file.api_keys.elevenlabs),
        };

        Ok(Self {
            language,
            phrase_window: Duration::from_secs_f64(phrase_seconds),
            stt: SttConfig {
                provider: stt_provider,
                model: stt_model,
            },
            tts: TtsConfig {
                provider: tts_provider,
                voice: tts_voice,
                model: tts_model,
                options,
            },
            api_keys,
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
